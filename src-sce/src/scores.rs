//! Objective scores attached to points, and fitness-assigned wrappers

use std::fmt;

use serde::{Deserialize, Serialize};

/// One named objective value with its orientation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveScore {
    pub name: String,
    pub value: f64,
    pub maximize: bool,
}

impl ObjectiveScore {
    pub fn new(name: &str, value: f64, maximize: bool) -> Self {
        Self { name: name.to_string(), value, maximize }
    }

    /// Objective to be minimised
    pub fn minimized(name: &str, value: f64) -> Self {
        Self::new(name, value, false)
    }

    /// Value oriented so that lower is better
    pub fn oriented(&self) -> f64 {
        if self.maximize { -self.value } else { self.value }
    }
}

impl fmt::Display for ObjectiveScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.6e}", self.name, self.value)
    }
}

/// A point together with the objective scores computed for it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint<T> {
    point: T,
    scores: Vec<ObjectiveScore>,
}

impl<T> ScoredPoint<T> {
    pub fn new(point: T, scores: Vec<ObjectiveScore>) -> Self {
        Self { point, scores }
    }

    /// Point with a single objective
    pub fn single(point: T, name: &str, value: f64, maximize: bool) -> Self {
        Self::new(point, vec![ObjectiveScore::new(name, value, maximize)])
    }

    pub fn point(&self) -> &T {
        &self.point
    }

    pub fn into_point(self) -> T {
        self.point
    }

    pub fn scores(&self) -> &[ObjectiveScore] {
        &self.scores
    }

    pub fn objective(&self, i: usize) -> Option<&ObjectiveScore> {
        self.scores.get(i)
    }

    pub fn objective_count(&self) -> usize {
        self.scores.len()
    }
}

/// A scored point with a scalar fitness; lower fitness is better
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessAssignedScore<T> {
    pub scored: ScoredPoint<T>,
    pub fitness: f64,
}

impl<T> FitnessAssignedScore<T> {
    pub fn new(scored: ScoredPoint<T>, fitness: f64) -> Self {
        Self { scored, fitness }
    }

    pub fn point(&self) -> &T {
        self.scored.point()
    }
}

/// Stable sort, best (lowest) fitness first
pub fn sort_by_fitness<T>(points: &mut [FitnessAssignedScore<T>]) {
    points.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oriented_value() {
        assert_eq!(ObjectiveScore::minimized("rmse", 2.0).oriented(), 2.0);
        assert_eq!(ObjectiveScore::new("nse", 0.7, true).oriented(), -0.7);
    }

    #[test]
    fn test_sort_by_fitness_is_stable() {
        let mut v = vec![
            FitnessAssignedScore::new(ScoredPoint::single("a", "f", 1.0, false), 2.0),
            FitnessAssignedScore::new(ScoredPoint::single("b", "f", 1.0, false), 1.0),
            FitnessAssignedScore::new(ScoredPoint::single("c", "f", 1.0, false), 2.0),
            FitnessAssignedScore::new(ScoredPoint::single("d", "f", 1.0, false), 0.5),
        ];
        sort_by_fitness(&mut v);
        let order: Vec<&str> = v.iter().map(|s| *s.point()).collect();
        assert_eq!(order, vec!["d", "b", "a", "c"]);
    }
}
