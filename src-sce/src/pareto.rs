//! Pareto dominance and ranking of multi-objective scores

use std::cmp::Ordering;

use crate::error::{Result, SceError};
use crate::scores::{ObjectiveScore, ScoredPoint};

/// Dominance comparison of two score vectors of the same length.
///
/// `-1` when `x` dominates `y`, `1` when `y` dominates `x`, `0` when they are
/// incomparable. A tie on any objective makes the points incomparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParetoComparer;

impl ParetoComparer {
    pub fn compare(&self, x: &[ObjectiveScore], y: &[ObjectiveScore]) -> i32 {
        let n = x.len().min(y.len());
        if n == 0 {
            return 0;
        }
        let first = Self::compare_one(&x[0], &y[0]);
        if first == 0 {
            return 0;
        }
        for i in 1..n {
            let c = Self::compare_one(&x[i], &y[i]);
            if c != first {
                return 0;
            }
        }
        first
    }

    fn compare_one(x: &ObjectiveScore, y: &ObjectiveScore) -> i32 {
        match x.oriented().partial_cmp(&y.oriented()) {
            Some(Ordering::Less) => -1,
            Some(Ordering::Greater) => 1,
            _ => 0,
        }
    }

    /// Number of points in `dominated` that `non_dominated` dominates
    pub fn count_dominated<T>(&self, non_dominated: &ScoredPoint<T>, dominated: &[&ScoredPoint<T>]) -> usize {
        dominated
            .iter()
            .filter(|d| self.compare(non_dominated.scores(), d.scores()) < 0)
            .count()
    }

    /// Whether `dominator` dominates `tested`
    pub fn is_dominated<T>(&self, tested: &ScoredPoint<T>, dominator: &ScoredPoint<T>) -> bool {
        self.compare(tested.scores(), dominator.scores()) > 0
    }
}

/// Successive non-dominated fronts of a population; rank 1 is the Pareto front
#[derive(Debug)]
pub struct ParetoRanking<'a, T> {
    points: &'a [ScoredPoint<T>],
    fronts: Vec<Vec<usize>>,
}

impl<'a, T> ParetoRanking<'a, T> {
    pub fn new(points: &'a [ScoredPoint<T>], comparer: ParetoComparer) -> Result<Self> {
        if points.is_empty() {
            return Err(SceError::EmptyPoints("pareto ranking"));
        }
        let n_obj = points[0].objective_count();
        if points.iter().any(|p| p.objective_count() != n_obj) {
            return Err(SceError::InvalidParameter(
                "all points must have the same number of objectives".to_string(),
            ));
        }
        let mut remaining: Vec<usize> = (0..points.len()).collect();
        let mut fronts = Vec::new();
        while !remaining.is_empty() {
            let (front, rest): (Vec<usize>, Vec<usize>) = remaining.iter().partition(|&&a| {
                !remaining
                    .iter()
                    .any(|&b| b != a && comparer.compare(points[a].scores(), points[b].scores()) > 0)
            });
            if front.is_empty() {
                return Err(SceError::ParetoInvariant { remaining: remaining.len() });
            }
            fronts.push(front);
            remaining = rest;
        }
        Ok(Self { points, fronts })
    }

    pub fn front_count(&self) -> usize {
        self.fronts.len()
    }

    /// Indices into the ranked slice of the points in rank `k` (1-based)
    pub fn rank_indices(&self, k: usize) -> &[usize] {
        match k.checked_sub(1).and_then(|i| self.fronts.get(i)) {
            Some(f) => f,
            None => &[],
        }
    }

    /// Points of rank `k` (1-based); empty when out of range
    pub fn rank(&self, k: usize) -> Vec<&'a ScoredPoint<T>> {
        self.rank_indices(k).iter().map(|&i| &self.points[i]).collect()
    }

    /// Indices of all points ranked strictly after rank `k`, rank by rank
    pub fn dominated_by_rank_indices(&self, k: usize) -> Vec<usize> {
        self.fronts.iter().skip(k).flatten().copied().collect()
    }

    /// All points ranked strictly after rank `k`
    pub fn dominated_by_rank(&self, k: usize) -> Vec<&'a ScoredPoint<T>> {
        self.dominated_by_rank_indices(k).into_iter().map(|i| &self.points[i]).collect()
    }
}
