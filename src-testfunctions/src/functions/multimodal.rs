//! Multimodal test functions
//!
//! These functions have many local minima and check that the shuffling of
//! complexes keeps the search global.

use ndarray::Array1;
use std::f64::consts::{E, PI};

/// Rastrigin function
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5.12, 5.12]
pub fn rastrigin(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    10.0 * n
        + x.iter()
            .map(|&xi| xi * xi - 10.0 * (2.0 * PI * xi).cos())
            .sum::<f64>()
}

/// Griewank function
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-600, 600]
pub fn griewank(x: &Array1<f64>) -> f64 {
    let quadratic: f64 = x.iter().map(|&xi| xi * xi).sum::<f64>() / 4000.0;
    let oscillation: f64 = x
        .iter()
        .enumerate()
        .map(|(i, &xi)| (xi / ((i + 1) as f64).sqrt()).cos())
        .product();
    1.0 + quadratic - oscillation
}

/// Ackley function
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-32.768, 32.768]
pub fn ackley(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let rms = (x.iter().map(|&xi| xi * xi).sum::<f64>() / n).sqrt();
    let mean_cos = x.iter().map(|&xi| (2.0 * PI * xi).cos()).sum::<f64>() / n;
    -20.0 * (-0.2 * rms).exp() - mean_cos.exp() + 20.0 + E
}
