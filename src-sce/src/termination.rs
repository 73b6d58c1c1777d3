//! Stop predicates consulted by the engine after each shuffle, and by each
//! complex between moves.

use std::time::{Duration, Instant};

use log::warn;

use crate::error::Result;
use crate::hypercube::HyperCube;
use crate::scores::FitnessAssignedScore;

/// Read-only view of the engine state handed to termination conditions
#[derive(Debug)]
pub struct SceState<'a, T> {
    /// Shuffle counter, 1 before the first round and incremented after each
    pub current_shuffle: usize,
    /// Population sorted by fitness at the last shuffle, if any
    pub population_at_shuffling: Option<&'a [FitnessAssignedScore<T>]>,
}

impl<'a, T> SceState<'a, T> {
    pub fn new(current_shuffle: usize) -> Self {
        Self { current_shuffle, population_at_shuffling: None }
    }

    pub fn with_population(mut self, population: &'a [FitnessAssignedScore<T>]) -> Self {
        self.population_at_shuffling = Some(population);
        self
    }
}

/// A predicate deciding when to stop evolving
pub trait TerminationCondition<T>: Send {
    /// Called once when evolution starts; wall clock conditions restart here
    fn start(&mut self) {}

    fn is_finished(&mut self, state: &SceState<'_, T>) -> bool;

    /// Remaining wall clock budget, for conditions that have one
    fn remaining_walltime(&self) -> Option<Duration> {
        None
    }
}

#[derive(Debug, Clone)]
struct WallClock {
    max: Option<Duration>,
    started: Instant,
}

impl WallClock {
    fn new(max: Option<Duration>) -> Self {
        Self { max, started: Instant::now() }
    }

    fn restart(&mut self) {
        self.started = Instant::now();
    }

    fn exceeded(&self) -> bool {
        self.max.is_some_and(|m| self.started.elapsed() > m)
    }

    fn remaining(&self) -> Option<Duration> {
        self.max.map(|m| m.saturating_sub(self.started.elapsed()))
    }
}

/// Stops once the shuffle counter reaches a maximum
#[derive(Debug, Clone, Copy)]
pub struct MaxShuffle {
    max_shuffle: usize,
}

impl MaxShuffle {
    pub fn new(max_shuffle: usize) -> Self {
        Self { max_shuffle }
    }
}

impl<T> TerminationCondition<T> for MaxShuffle {
    fn is_finished(&mut self, state: &SceState<'_, T>) -> bool {
        state.current_shuffle >= self.max_shuffle
    }
}

/// Never stops
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFalse;

impl<T> TerminationCondition<T> for AlwaysFalse {
    fn is_finished(&mut self, _state: &SceState<'_, T>) -> bool {
        false
    }
}

/// Stops when a wall clock budget is spent; `None` never stops
#[derive(Debug, Clone)]
pub struct MaxWalltime {
    clock: WallClock,
}

impl MaxWalltime {
    pub fn new(max: Option<Duration>) -> Self {
        Self { clock: WallClock::new(max) }
    }
}

impl<T> TerminationCondition<T> for MaxWalltime {
    fn start(&mut self) {
        self.clock.restart();
    }

    fn is_finished(&mut self, _state: &SceState<'_, T>) -> bool {
        self.clock.exceeded()
    }

    fn remaining_walltime(&self) -> Option<Duration> {
        self.clock.remaining()
    }
}

/// Coefficient of variation `|sd / mean|` with the sample standard deviation.
///
/// A zero mean gives 0 when all values are equal and +inf otherwise.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    let sd = (ss / (n - 1) as f64).sqrt();
    if mean == 0.0 {
        if sd == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        (sd / mean).abs()
    }
}

/// Largest per-variable coefficient of variation over `points`
pub fn max_parameter_coefficient_of_variation<T: HyperCube>(points: &[&T]) -> Result<f64> {
    let Some(first) = points.first() else {
        return Ok(0.0);
    };
    let mut max_cv = f64::NEG_INFINITY;
    for name in first.variable_names() {
        let values = points.iter().map(|p| p.value(&name)).collect::<Result<Vec<f64>>>()?;
        max_cv = max_cv.max(coefficient_of_variation(&values));
    }
    Ok(max_cv)
}

/// Stops when the best half of the last shuffled population has a maximum
/// per-variable coefficient of variation below a threshold, when the shuffle
/// count reaches its maximum, or when the wall clock budget is spent.
#[derive(Debug, Clone)]
pub struct CoefficientOfVariation {
    threshold: f64,
    max_shuffle: usize,
    clock: WallClock,
}

impl CoefficientOfVariation {
    pub const DEFAULT_THRESHOLD: f64 = 2.5e-2;

    pub fn new(threshold: f64, max_walltime: Option<Duration>, max_shuffle: usize) -> Self {
        Self { threshold, max_shuffle, clock: WallClock::new(max_walltime) }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_below_threshold<T: HyperCube>(&self, points: &[&T]) -> Result<bool> {
        Ok(max_parameter_coefficient_of_variation(points)? < self.threshold)
    }

    pub fn has_reached_max_time(&self) -> bool {
        self.clock.exceeded()
    }
}

impl Default for CoefficientOfVariation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD, Some(Duration::from_secs(3600)), 15)
    }
}

impl<T: HyperCube> TerminationCondition<T> for CoefficientOfVariation {
    fn start(&mut self) {
        self.clock.restart();
    }

    fn is_finished(&mut self, state: &SceState<'_, T>) -> bool {
        if self.clock.exceeded() || state.current_shuffle >= self.max_shuffle {
            return true;
        }
        let Some(population) = state.population_at_shuffling else {
            return false;
        };
        let n = population.len().div_ceil(2);
        let best_half: Vec<&T> = population.iter().take(n).map(|s| s.point()).collect();
        match self.is_below_threshold(&best_half) {
            Ok(below) => below,
            Err(e) => {
                warn!("coefficient of variation could not be computed: {}", e);
                false
            }
        }
    }

    fn remaining_walltime(&self) -> Option<Duration> {
        self.clock.remaining()
    }
}

/// Stops once the best fitness has changed by no more than
/// `|previous * tolerance|` for more than `cutoff` consecutive shuffles, or
/// when the wall clock budget is spent.
#[derive(Debug, Clone)]
pub struct MarginalImprovement {
    tolerance: f64,
    cutoff: usize,
    converging: usize,
    previous_best: Option<f64>,
    clock: WallClock,
}

impl MarginalImprovement {
    pub fn new(tolerance: f64, cutoff: usize, max_walltime: Option<Duration>) -> Self {
        Self { tolerance, cutoff, converging: 0, previous_best: None, clock: WallClock::new(max_walltime) }
    }
}

impl<T> TerminationCondition<T> for MarginalImprovement {
    fn start(&mut self) {
        self.clock.restart();
        self.converging = 0;
        self.previous_best = None;
    }

    fn is_finished(&mut self, state: &SceState<'_, T>) -> bool {
        if self.clock.exceeded() {
            return true;
        }
        let Some(best) = state.population_at_shuffling.and_then(|p| p.first()) else {
            return false;
        };
        let current = best.fitness;
        let Some(previous) = self.previous_best else {
            self.previous_best = Some(current);
            return false;
        };
        if (current - previous).abs() <= (previous * self.tolerance).abs() {
            self.converging += 1;
        } else {
            self.converging = 0;
        }
        self.previous_best = Some(current);
        self.converging > self.cutoff
    }

    fn remaining_walltime(&self) -> Option<Duration> {
        self.clock.remaining()
    }
}
