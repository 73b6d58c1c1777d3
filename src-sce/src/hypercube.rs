//! Capability traits for points in a bounded parameter space, and the
//! default named implementation [`ParameterSet`].
//!
//! The engine is generic over one concrete point type bounded by [`HyperCube`];
//! anything that can describe itself, push its values into a model, and expose
//! named bounded variables can be optimised.

use std::collections::HashMap;
use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceError};

/// A model or simulation that accepts named parameter values
pub trait ParameterizedSystem {
    fn set_parameter(&mut self, name: &str, value: f64);
}

impl ParameterizedSystem for HashMap<String, f64> {
    fn set_parameter(&mut self, name: &str, value: f64) {
        self.insert(name.to_string(), value);
    }
}

/// Something that can be described and applied to a system before it is run
pub trait Configuration {
    /// Human readable one-line summary
    fn describe(&self) -> String;
    /// Push this configuration into `system`
    fn apply<S: ParameterizedSystem + ?Sized>(&self, system: &mut S);
}

/// Cloning capability, with a flag telling whether clones may run on other threads.
///
/// Evaluators returning `false` are only ever used from the calling thread.
pub trait Cloneable: Clone {
    fn supports_thread_safe_cloning(&self) -> bool {
        true
    }
}

/// A point with named, bounded, real-valued dimensions
pub trait HyperCube: Configuration + Clone + Send + Sync {
    /// Variable names, in a stable order
    fn variable_names(&self) -> Vec<String>;
    fn dimensions(&self) -> usize {
        self.variable_names().len()
    }
    fn value(&self, name: &str) -> Result<f64>;
    fn min_value(&self, name: &str) -> Result<f64>;
    fn max_value(&self, name: &str) -> Result<f64>;
    /// Set a value; values outside the variable's bounds are rejected
    fn set_value(&mut self, name: &str, value: f64) -> Result<()>;
}

/// One named dimension of a [`ParameterSet`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Ordered set of named bounded variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    variables: Vec<Variable>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self { variables: Vec::new() }
    }

    /// Add a variable. Duplicated names, inverted bounds, and values outside the
    /// bounds are rejected.
    pub fn define(&mut self, name: &str, value: f64, min: f64, max: f64) -> Result<()> {
        if self.variables.iter().any(|v| v.name == name) {
            return Err(SceError::InvalidParameter(format!("variable '{}' defined twice", name)));
        }
        if !(min <= max) {
            return Err(SceError::InvalidParameter(format!(
                "variable '{}' has min {} > max {}",
                name, min, max
            )));
        }
        if value < min || value > max {
            return Err(SceError::OutOfBounds { name: name.to_string(), value, min, max });
        }
        self.variables.push(Variable { name: name.to_string(), value, min, max });
        Ok(())
    }

    /// Builder flavour of [`ParameterSet::define`]
    pub fn with_variable(mut self, name: &str, value: f64, min: f64, max: f64) -> Result<Self> {
        self.define(name, value, min, max)?;
        Ok(self)
    }

    /// Variables `x0..xn` at the centre of each `(lower, upper)` pair
    pub fn from_bounds(bounds: &[(f64, f64)]) -> Result<Self> {
        let mut p = Self::new();
        for (i, &(lo, hi)) in bounds.iter().enumerate() {
            p.define(&format!("x{}", i), 0.5 * (lo + hi), lo, hi)?;
        }
        Ok(p)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn values(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.value).collect()
    }

    /// Values as an ndarray vector, in variable order
    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(self.values())
    }

    fn variable(&self, name: &str) -> Result<&Variable> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| SceError::UnknownVariable(name.to_string()))
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> =
            self.variables.iter().map(|v| format!("{}={:.6}", v.name, v.value)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl Configuration for ParameterSet {
    fn describe(&self) -> String {
        self.to_string()
    }

    fn apply<S: ParameterizedSystem + ?Sized>(&self, system: &mut S) {
        for v in &self.variables {
            system.set_parameter(&v.name, v.value);
        }
    }
}

impl HyperCube for ParameterSet {
    fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    fn dimensions(&self) -> usize {
        self.variables.len()
    }

    fn value(&self, name: &str) -> Result<f64> {
        Ok(self.variable(name)?.value)
    }

    fn min_value(&self, name: &str) -> Result<f64> {
        Ok(self.variable(name)?.min)
    }

    fn max_value(&self, name: &str) -> Result<f64> {
        Ok(self.variable(name)?.max)
    }

    fn set_value(&mut self, name: &str, value: f64) -> Result<()> {
        let v = self
            .variables
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or_else(|| SceError::UnknownVariable(name.to_string()))?;
        if value < v.min || value > v.max {
            return Err(SceError::OutOfBounds {
                name: name.to_string(),
                value,
                min: v.min,
                max: v.max,
            });
        }
        v.value = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_read_back() {
        let p = ParameterSet::new()
            .with_variable("a", 1.0, 0.0, 2.0)
            .unwrap()
            .with_variable("b", -1.0, -5.0, 5.0)
            .unwrap();
        assert_eq!(p.dimensions(), 2);
        assert_eq!(p.variable_names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(p.value("b").unwrap(), -1.0);
        assert_eq!(p.min_value("a").unwrap(), 0.0);
        assert_eq!(p.max_value("b").unwrap(), 5.0);
    }

    #[test]
    fn test_rejects_invalid_definitions() {
        let mut p = ParameterSet::new();
        assert!(p.define("a", 3.0, 0.0, 2.0).is_err());
        assert!(p.define("a", 1.0, 2.0, 0.0).is_err());
        p.define("a", 1.0, 0.0, 2.0).unwrap();
        assert!(p.define("a", 1.0, 0.0, 2.0).is_err());
    }

    #[test]
    fn test_set_value_respects_bounds() {
        let mut p = ParameterSet::from_bounds(&[(0.0, 4.0)]).unwrap();
        assert_eq!(p.value("x0").unwrap(), 2.0);
        p.set_value("x0", 3.5).unwrap();
        assert_eq!(p.value("x0").unwrap(), 3.5);
        assert!(matches!(p.set_value("x0", 4.5), Err(SceError::OutOfBounds { .. })));
        assert!(matches!(p.set_value("nope", 1.0), Err(SceError::UnknownVariable(_))));
    }

    #[test]
    fn test_apply_to_system() {
        let p = ParameterSet::from_bounds(&[(0.0, 2.0), (10.0, 20.0)]).unwrap();
        let mut model: HashMap<String, f64> = HashMap::new();
        p.apply(&mut model);
        assert_eq!(model["x0"], 1.0);
        assert_eq!(model["x1"], 15.0);
        assert_eq!(p.describe(), "x0=1.000000, x1=15.000000");
    }
}
