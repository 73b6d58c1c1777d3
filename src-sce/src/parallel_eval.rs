use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::evaluator::ObjectiveEvaluator;
use crate::hypercube::Cloneable;
use crate::scores::ScoredPoint;

/// Configuration for parallel evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Enable parallel evaluation
    pub enabled: bool,
    /// Cap on the number of slices (None = use all available cores)
    pub num_threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { enabled: true, num_threads: None }
    }
}

impl ParallelConfig {
    pub fn serial() -> Self {
        Self { enabled: false, num_threads: None }
    }

    /// Number of slices to split `n` work items into
    pub fn slice_count(&self, n: usize) -> usize {
        if !self.enabled || n == 0 {
            return 1;
        }
        let cap = self.num_threads.unwrap_or(usize::MAX);
        num_cpus::get().min(cap).min(n).max(1)
    }
}

/// Map `f` over `items`, in order.
///
/// When parallelism is enabled and the evaluator supports thread-safe cloning,
/// the items are cut into contiguous slices; each slice runs on a rayon worker
/// with its own clone of `evaluator`. Otherwise everything runs on the calling
/// thread with `evaluator` itself. The first error aborts the map.
pub fn map_sliced<I, O, E, F>(items: Vec<I>, evaluator: &mut E, config: &ParallelConfig, f: F) -> Result<Vec<O>>
where
    I: Send,
    O: Send,
    E: Cloneable + Send,
    F: Fn(&mut E, I) -> Result<O> + Sync,
{
    let slices = config.slice_count(items.len());
    if slices <= 1 || !evaluator.supports_thread_safe_cloning() {
        return items.into_iter().map(|item| f(evaluator, item)).collect();
    }

    let size = items.len().div_ceil(slices);
    let mut it = items.into_iter();
    let mut work: Vec<(E, Vec<I>)> = Vec::with_capacity(slices);
    loop {
        let chunk: Vec<I> = it.by_ref().take(size).collect();
        if chunk.is_empty() {
            break;
        }
        work.push((evaluator.clone(), chunk));
    }

    let results: Vec<Result<Vec<O>>> = work
        .into_par_iter()
        .map(|(mut e, chunk)| chunk.into_iter().map(|item| f(&mut e, item)).collect())
        .collect();

    let mut out = Vec::new();
    for r in results {
        out.extend(r?);
    }
    Ok(out)
}

/// Evaluate `points`, skipping the ones not yet started once `cancel` is set.
///
/// The returned scores keep the order of `points`; fewer are returned after a
/// cancellation.
pub fn evaluate_population<T, E>(
    points: Vec<T>,
    evaluator: &mut E,
    config: &ParallelConfig,
    cancel: &AtomicBool,
) -> Result<Vec<ScoredPoint<T>>>
where
    T: Send,
    E: ObjectiveEvaluator<T>,
{
    let scored = map_sliced(points, evaluator, config, |e, p| {
        if cancel.load(Ordering::SeqCst) {
            return Ok(None);
        }
        e.evaluate(&p).map(Some)
    })?;
    Ok(scored.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::ObjectiveFunctionEvaluator;
    use crate::hypercube::ParameterSet;
    use ndarray::Array1;

    fn points(n: usize) -> Vec<ParameterSet> {
        (0..n)
            .map(|i| ParameterSet::new().with_variable("x0", i as f64, 0.0, 100.0).unwrap())
            .collect()
    }

    #[test]
    fn test_slice_count() {
        assert_eq!(ParallelConfig::serial().slice_count(10), 1);
        let capped = ParallelConfig { enabled: true, num_threads: Some(1) };
        assert_eq!(capped.slice_count(10), 1);
        let cfg = ParallelConfig::default();
        assert!(cfg.slice_count(3) <= 3);
        assert_eq!(cfg.slice_count(0), 1);
    }

    #[test]
    fn test_parallel_matches_serial_order() {
        let mut e = ObjectiveFunctionEvaluator::minimize("sq", |x: &Array1<f64>| x[0] * x[0]);
        let never = AtomicBool::new(false);
        let par = evaluate_population(points(37), &mut e, &ParallelConfig::default(), &never).unwrap();
        let ser = evaluate_population(points(37), &mut e, &ParallelConfig::serial(), &never).unwrap();
        assert_eq!(par.len(), 37);
        for (i, (a, b)) in par.iter().zip(&ser).enumerate() {
            assert_eq!(a.objective(0).unwrap().value, (i * i) as f64);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_cancelled_evaluation_skips_points() {
        let mut e = ObjectiveFunctionEvaluator::minimize("sq", |x: &Array1<f64>| x[0]);
        let cancelled = AtomicBool::new(true);
        let r = evaluate_population(points(10), &mut e, &ParallelConfig::default(), &cancelled).unwrap();
        assert!(r.is_empty());
    }
}
