//! Unimodal test functions

use ndarray::Array1;

/// Sphere function
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5.12, 5.12]
pub fn sphere(x: &Array1<f64>) -> f64 {
    x.iter().map(|&xi| xi * xi).sum()
}

/// Paraboloid centred on (2, 2, ..., 2)
/// Global minimum: f(x) = 0 at x = (2, 2, ..., 2)
/// Bounds: x_i in [-10, 10]
pub fn paraboloid(x: &Array1<f64>) -> f64 {
    shifted_paraboloid(x, 2.0)
}

/// Paraboloid with its minimum at `(centre, ..., centre)`
pub fn shifted_paraboloid(x: &Array1<f64>, centre: f64) -> f64 {
    x.iter().map(|&xi| (xi - centre).powi(2)).sum()
}

/// Rosenbrock function, N-dimensional valley
/// Global minimum: f(x) = 0 at x = (1, 1, ..., 1)
/// Bounds: x_i in [-2.048, 2.048]
pub fn rosenbrock(x: &Array1<f64>) -> f64 {
    (1..x.len())
        .map(|i| 100.0 * (x[i] - x[i - 1] * x[i - 1]).powi(2) + (1.0 - x[i - 1]).powi(2))
        .sum()
}

/// Sum of squares weighted by index
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-10, 10]
pub fn sum_squares(x: &Array1<f64>) -> f64 {
    x.iter()
        .enumerate()
        .map(|(i, &xi)| (i + 1) as f64 * xi * xi)
        .sum()
}
