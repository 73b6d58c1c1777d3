//! Fitness assignment strategies reducing objective scores to a scalar where
//! lower is always better.

use crate::error::{Result, SceError};
use crate::pareto::{ParetoComparer, ParetoRanking};
use crate::scores::{FitnessAssignedScore, ScoredPoint, sort_by_fitness};

/// Strategy turning a set of scored points into fitness-assigned points.
///
/// The fitness of a point may depend on the whole set (e.g. Pareto based
/// strategies), so assignments are always made on a full set.
pub trait FitnessAssignment<T>: Send + Sync {
    /// `(index in scores, fitness)` pairs, in the order the strategy lists them
    fn rank_fitness(&self, scores: &[ScoredPoint<T>]) -> Result<Vec<(usize, f64)>>;

    fn assign_fitness(&self, scores: &[ScoredPoint<T>]) -> Result<Vec<FitnessAssignedScore<T>>>
    where
        T: Clone,
    {
        Ok(self
            .rank_fitness(scores)?
            .into_iter()
            .map(|(i, f)| FitnessAssignedScore::new(scores[i].clone(), f))
            .collect())
    }

    /// Assign fitness and sort, best first
    fn assign_sorted(&self, scores: &[ScoredPoint<T>]) -> Result<Vec<FitnessAssignedScore<T>>>
    where
        T: Clone,
    {
        let mut assigned = self.assign_fitness(scores)?;
        sort_by_fitness(&mut assigned);
        Ok(assigned)
    }
}

/// Single-objective fitness: the first objective, negated when maximised
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFitnessAssignment;

impl<T> FitnessAssignment<T> for DefaultFitnessAssignment {
    fn rank_fitness(&self, scores: &[ScoredPoint<T>]) -> Result<Vec<(usize, f64)>> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let objective = s.objective(0).ok_or_else(|| {
                    SceError::InvalidParameter("scored point without any objective".to_string())
                })?;
                Ok((i, objective.oriented()))
            })
            .collect()
    }
}

/// Zitler-Thiele (SPEA) strength fitness.
///
/// Non-dominated points get the fraction of the population they dominate;
/// dominated points get one plus the sum of the strengths of the non-dominated
/// points dominating them. Non-dominated points come first in the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZitlerThieleFitnessAssignment {
    comparer: ParetoComparer,
}

impl ZitlerThieleFitnessAssignment {
    pub fn new() -> Self {
        Self { comparer: ParetoComparer }
    }
}

impl<T> FitnessAssignment<T> for ZitlerThieleFitnessAssignment {
    fn rank_fitness(&self, scores: &[ScoredPoint<T>]) -> Result<Vec<(usize, f64)>> {
        let ranking = ParetoRanking::new(scores, self.comparer)?;
        let n = scores.len() as f64;
        let non_dominated = ranking.rank_indices(1);
        let dominated = ranking.dominated_by_rank_indices(1);
        let dominated_points: Vec<&ScoredPoint<T>> = dominated.iter().map(|&i| &scores[i]).collect();

        let strengths: Vec<f64> = non_dominated
            .iter()
            .map(|&i| self.comparer.count_dominated(&scores[i], &dominated_points) as f64 / n)
            .collect();

        let mut result = Vec::with_capacity(scores.len());
        for (k, &i) in non_dominated.iter().enumerate() {
            result.push((i, strengths[k]));
        }
        for &d in &dominated {
            let mut fitness = 1.0;
            for (k, &i) in non_dominated.iter().enumerate() {
                if self.comparer.is_dominated(&scores[d], &scores[i]) {
                    fitness += strengths[k];
                }
            }
            result.push((d, fitness));
        }
        Ok(result)
    }
}
