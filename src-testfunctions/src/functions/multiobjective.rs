//! Multi-objective test functions
//!
//! Each function returns one value per objective, all to be minimised.

use ndarray::Array1;

/// Schaffer's SCH1: f1 = x^2, f2 = (x - 2)^2
/// Pareto set: x in [0, 2]
/// Bounds: x in [-10, 10]
pub fn sch1(x: &Array1<f64>) -> Vec<f64> {
    let v = x[0];
    vec![v * v, (v - 2.0).powi(2)]
}

/// Fonseca-Fleming, N-dimensional, two objectives
/// Pareto set: x_i = t for t in [-1/sqrt(n), 1/sqrt(n)]
/// Bounds: x_i in [-4, 4]
pub fn fonseca_fleming(x: &Array1<f64>) -> Vec<f64> {
    let shift = 1.0 / (x.len() as f64).sqrt();
    let minus: f64 = x.iter().map(|&xi| (xi - shift).powi(2)).sum();
    let plus: f64 = x.iter().map(|&xi| (xi + shift).powi(2)).sum();
    vec![1.0 - (-minus).exp(), 1.0 - (-plus).exp()]
}

/// True if `(f1, f2)` lies on the SCH1 front within `tol`
pub fn on_sch1_front(f1: f64, f2: f64, tol: f64) -> bool {
    if f1 < -tol || f1 > 4.0 + tol {
        return false;
    }
    let x = f1.max(0.0).sqrt();
    (f2 - (x - 2.0).powi(2)).abs() <= tol
}
