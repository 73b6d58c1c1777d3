use std::fmt;
use std::time::Duration;

use crate::hypercube::HyperCube;
use crate::scores::{FitnessAssignedScore, ScoredPoint};

/// Final population of a run, ranked by fitness, with run statistics
#[derive(Debug, Clone)]
pub struct OptimizationResults<T> {
    ranked: Vec<FitnessAssignedScore<T>>,
    /// Number of completed shuffles
    pub shuffles: usize,
    /// Number of objective evaluations
    pub evaluations: usize,
    /// Whether the run was stopped by cancellation
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl<T> OptimizationResults<T> {
    /// `ranked` must be sorted best first
    pub(crate) fn new(
        ranked: Vec<FitnessAssignedScore<T>>,
        shuffles: usize,
        evaluations: usize,
        cancelled: bool,
        elapsed: Duration,
    ) -> Self {
        Self { ranked, shuffles, evaluations, cancelled, elapsed }
    }

    /// Population, best fitness first
    pub fn ranked(&self) -> &[FitnessAssignedScore<T>] {
        &self.ranked
    }

    pub fn best(&self) -> Option<&ScoredPoint<T>> {
        self.ranked.first().map(|f| &f.scored)
    }

    pub fn best_fitness(&self) -> Option<f64> {
        self.ranked.first().map(|f| f.fitness)
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn into_population(self) -> Vec<ScoredPoint<T>> {
        self.ranked.into_iter().map(|f| f.scored).collect()
    }
}

impl<T: HyperCube> fmt::Display for OptimizationResults<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SCE: {} points after {} shuffles, {} evaluations in {:.3}s{}",
            self.ranked.len(),
            self.shuffles,
            self.evaluations,
            self.elapsed.as_secs_f64(),
            if self.cancelled { " (cancelled)" } else { "" }
        )?;
        match self.best() {
            Some(best) => {
                for s in best.scores() {
                    writeln!(f, "  {}", s)?;
                }
                write!(f, "  {}", best.point().describe())
            }
            None => write!(f, "  no evaluated point"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypercube::ParameterSet;

    #[test]
    fn test_best_and_display() {
        let a = ParameterSet::new().with_variable("x0", 1.0, 0.0, 2.0).unwrap();
        let b = ParameterSet::new().with_variable("x0", 0.5, 0.0, 2.0).unwrap();
        let ranked = vec![
            FitnessAssignedScore::new(ScoredPoint::single(b, "sse", 0.25, false), 0.25),
            FitnessAssignedScore::new(ScoredPoint::single(a, "sse", 1.0, false), 1.0),
        ];
        let r = OptimizationResults::new(ranked, 4, 120, false, Duration::from_millis(1500));
        assert_eq!(r.len(), 2);
        assert_eq!(r.best_fitness(), Some(0.25));
        let text = r.to_string();
        assert!(text.contains("after 4 shuffles, 120 evaluations"), "{}", text);
        assert!(text.contains("sse: 2.500000e-1"), "{}", text);
        assert!(text.contains("x0=0.500000"), "{}", text);
    }
}
