//! Objective evaluators: the bridge between candidate points and the model
//! being calibrated.

use std::fmt;
use std::sync::Arc;

use ndarray::Array1;

use crate::error::{Result, SceError};
use crate::hypercube::{Cloneable, HyperCube};
use crate::scores::{ObjectiveScore, ScoredPoint};

/// Computes the objective scores of a point.
///
/// Evaluators are cloned once per parallel slice when
/// [`Cloneable::supports_thread_safe_cloning`] returns `true`; otherwise the
/// engine only ever calls the instance it owns, from the calling thread.
pub trait ObjectiveEvaluator<T>: Cloneable + Send {
    fn evaluate(&mut self, point: &T) -> Result<ScoredPoint<T>>;
}

type ObjectiveFn = Arc<dyn Fn(&Array1<f64>) -> Vec<f64> + Send + Sync>;

/// Evaluator wrapping a closure over the point's values, in variable order
#[derive(Clone)]
pub struct ObjectiveFunctionEvaluator {
    func: ObjectiveFn,
    names: Vec<String>,
    maximize: Vec<bool>,
    thread_safe: bool,
}

impl fmt::Debug for ObjectiveFunctionEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectiveFunctionEvaluator")
            .field("names", &self.names)
            .field("maximize", &self.maximize)
            .field("thread_safe", &self.thread_safe)
            .finish()
    }
}

impl ObjectiveFunctionEvaluator {
    /// Single objective to minimise
    pub fn minimize<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Array1<f64>) -> f64 + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |x| vec![f(x)]),
            names: vec![name.to_string()],
            maximize: vec![false],
            thread_safe: true,
        }
    }

    /// Several objectives, one `(name, maximize)` pair per returned value
    pub fn multi<F>(objectives: &[(&str, bool)], f: F) -> Self
    where
        F: Fn(&Array1<f64>) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(f),
            names: objectives.iter().map(|(n, _)| n.to_string()).collect(),
            maximize: objectives.iter().map(|(_, m)| *m).collect(),
            thread_safe: true,
        }
    }

    /// Declare whether clones may be used from worker threads
    pub fn thread_safe(mut self, v: bool) -> Self {
        self.thread_safe = v;
        self
    }

    pub fn objective_count(&self) -> usize {
        self.names.len()
    }
}

impl Cloneable for ObjectiveFunctionEvaluator {
    fn supports_thread_safe_cloning(&self) -> bool {
        self.thread_safe
    }
}

impl<T: HyperCube> ObjectiveEvaluator<T> for ObjectiveFunctionEvaluator {
    fn evaluate(&mut self, point: &T) -> Result<ScoredPoint<T>> {
        let x = point
            .variable_names()
            .iter()
            .map(|n| point.value(n))
            .collect::<Result<Vec<f64>>>()?;
        let values = (self.func)(&Array1::from(x));
        if values.len() != self.names.len() {
            return Err(SceError::Evaluation(format!(
                "objective function returned {} values, expected {}",
                values.len(),
                self.names.len()
            )));
        }
        let scores = self
            .names
            .iter()
            .zip(&self.maximize)
            .zip(values)
            .map(|((name, &max), v)| ObjectiveScore::new(name, v, max))
            .collect();
        Ok(ScoredPoint::new(point.clone(), scores))
    }
}
