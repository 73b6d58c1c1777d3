//! Optimization test functions library
//!
//! A small collection of benchmark objectives used to validate the SCE-UA
//! optimiser: unimodal bowls and valleys, multimodal landscapes and
//! two-objective problems with a known Pareto front.
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array1;
//! use sceua_testfunctions::*;
//!
//! let x = Array1::from_vec(vec![2.0, 2.0]);
//! assert_eq!(paraboloid(&x), 0.0);
//!
//! let meta = get_function_metadata();
//! let bounds = get_function_bounds("paraboloid", 2);
//! assert_eq!(bounds, Some(vec![(-10.0, 10.0); 2]));
//! assert!(meta.contains_key("sphere"));
//! ```

use ndarray::Array1;
use std::collections::HashMap;

pub mod functions;
pub use functions::*;

/// Scalar objective signature
pub type ScalarFn = fn(&Array1<f64>) -> f64;

/// Metadata for a scalar test function
#[derive(Debug, Clone)]
pub struct FunctionMetadata {
    /// Function name
    pub name: String,
    /// Bounds shared by every dimension (min, max)
    pub bound: (f64, f64),
    /// Value of every coordinate at the global minimum
    pub argmin: f64,
    /// Global minimum value
    pub min_value: f64,
    /// Description of the function
    pub description: String,
    /// Whether the function is multimodal
    pub multimodal: bool,
    /// Typical dimension(s) for the function
    pub dimensions: Vec<usize>,
    /// The function itself
    pub function: ScalarFn,
}

impl FunctionMetadata {
    /// Bounds repeated for `n` dimensions
    pub fn bounds(&self, n: usize) -> Vec<(f64, f64)> {
        vec![self.bound; n]
    }

    /// Location of the global minimum in `n` dimensions
    pub fn global_minimum(&self, n: usize) -> Vec<f64> {
        vec![self.argmin; n]
    }
}

fn entry(
    name: &str,
    bound: (f64, f64),
    argmin: f64,
    description: &str,
    multimodal: bool,
    function: ScalarFn,
) -> (String, FunctionMetadata) {
    (
        name.to_string(),
        FunctionMetadata {
            name: name.to_string(),
            bound,
            argmin,
            min_value: 0.0,
            description: description.to_string(),
            multimodal,
            dimensions: vec![2, 5, 10],
            function,
        },
    )
}

/// Get metadata for all available scalar test functions
pub fn get_function_metadata() -> HashMap<String, FunctionMetadata> {
    HashMap::from([
        entry("sphere", (-5.12, 5.12), 0.0, "Convex quadratic bowl", false, sphere),
        entry(
            "paraboloid",
            (-10.0, 10.0),
            2.0,
            "Quadratic bowl centred on (2, ..., 2)",
            false,
            paraboloid,
        ),
        entry(
            "rosenbrock",
            (-2.048, 2.048),
            1.0,
            "Narrow curved valley",
            false,
            rosenbrock,
        ),
        entry(
            "sum_squares",
            (-10.0, 10.0),
            0.0,
            "Axis weighted quadratic bowl",
            false,
            sum_squares,
        ),
        entry(
            "rastrigin",
            (-5.12, 5.12),
            0.0,
            "Regular grid of local minima",
            true,
            rastrigin,
        ),
        entry(
            "griewank",
            (-600.0, 600.0),
            0.0,
            "Product of cosines over a wide bowl",
            true,
            griewank,
        ),
        entry(
            "ackley",
            (-32.768, 32.768),
            0.0,
            "Nearly flat outer region with a deep central hole",
            true,
            ackley,
        ),
    ])
}

/// Look up a scalar test function by name
pub fn get_function(name: &str) -> Option<ScalarFn> {
    get_function_metadata().get(name).map(|m| m.function)
}

/// Bounds of a named function in `n` dimensions
pub fn get_function_bounds(name: &str, n: usize) -> Option<Vec<(f64, f64)>> {
    get_function_metadata().get(name).map(|m| m.bounds(n))
}

/// Sorted names of the scalar test functions
pub fn function_names() -> Vec<String> {
    let mut names: Vec<String> = get_function_metadata().into_keys().collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minima_are_zero() {
        let tolerance = 1e-12;
        for (name, meta) in get_function_metadata() {
            for n in [2, 5] {
                let x = Array1::from_vec(meta.global_minimum(n));
                let f = (meta.function)(&x);
                assert!(
                    (f - meta.min_value).abs() < tolerance,
                    "{} at its minimum gives {}",
                    name,
                    f
                );
            }
        }
    }

    #[test]
    fn test_minima_are_inside_bounds() {
        for (name, meta) in get_function_metadata() {
            let (lower, upper) = meta.bound;
            assert!(lower < upper, "{} has invalid bounds", name);
            assert!(meta.argmin >= lower && meta.argmin <= upper, "{}", name);
            assert!(!meta.description.is_empty());
        }
    }

    #[test]
    fn test_values_away_from_minimum() {
        let x = Array1::from_vec(vec![1.0, -1.0]);
        assert_eq!(sphere(&x), 2.0);
        assert_eq!(paraboloid(&x), 10.0);
        assert_eq!(sum_squares(&x), 3.0);
        // (1 - 1)^2 + 100 * (-1 - 1)^2
        assert_eq!(rosenbrock(&x), 400.0);
        assert!((rastrigin(&x) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_lookup() {
        assert!(get_function("ackley").is_some());
        assert!(get_function("unknown").is_none());
        assert_eq!(get_function_bounds("sphere", 3), Some(vec![(-5.12, 5.12); 3]));
        let names = function_names();
        assert_eq!(names.first().map(String::as_str), Some("ackley"));
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_sch1_front() {
        for x in [0.0, 0.5, 1.0, 2.0] {
            let f = sch1(&Array1::from_vec(vec![x]));
            assert!(on_sch1_front(f[0], f[1], 1e-12));
        }
        let f = sch1(&Array1::from_vec(vec![3.0]));
        assert!(!on_sch1_front(f[0], f[1], 1e-6));
        let f = fonseca_fleming(&Array1::from_vec(vec![0.0, 0.0]));
        assert!((f[0] - f[1]).abs() < 1e-12);
    }
}
