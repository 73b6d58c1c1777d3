//! Candidate factories generating the initial population
//!
//! - `UniformRandomSampling`: every variable uniform within its bounds
//! - `LatinHypercubeSampling`: every variable uniform within a randomly chosen cell
//! - `BestOfSampling`: best points of a larger evaluated pool, handed out in order

use rand::Rng;

use crate::error::{Result, SceError};
use crate::evaluator::ObjectiveEvaluator;
use crate::fitness::FitnessAssignment;
use crate::geometry::{random_within, uniform_in};
use crate::hypercube::HyperCube;

/// Source of new points
pub trait CandidateFactory<T>: Send {
    fn create_random_candidate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<T>;
}

/// Uniform sampling within the bounds of a template point
#[derive(Debug, Clone)]
pub struct UniformRandomSampling<T> {
    template: T,
}

impl<T: HyperCube> UniformRandomSampling<T> {
    pub fn new(template: T) -> Self {
        Self { template }
    }
}

impl<T: HyperCube> CandidateFactory<T> for UniformRandomSampling<T> {
    fn create_random_candidate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<T> {
        random_within(&self.template, rng)
    }
}

/// Stratified sampling: the range of every variable is cut into `n_div`
/// cells, a cell is drawn in `[0, n_div - 1)` then a value uniformly within it
#[derive(Debug, Clone)]
pub struct LatinHypercubeSampling<T> {
    template: T,
    n_div: usize,
}

impl<T: HyperCube> LatinHypercubeSampling<T> {
    pub const DEFAULT_DIVISIONS: usize = 5;

    pub fn new(template: T, n_div: usize) -> Result<Self> {
        if n_div < 2 {
            return Err(SceError::InvalidParameter(format!(
                "latin hypercube sampling needs at least 2 divisions, got {}",
                n_div
            )));
        }
        Ok(Self { template, n_div })
    }
}

impl<T: HyperCube> CandidateFactory<T> for LatinHypercubeSampling<T> {
    fn create_random_candidate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<T> {
        let mut result = self.template.clone();
        for name in result.variable_names() {
            let lo = result.min_value(&name)?;
            let hi = result.max_value(&name)?;
            let d = (hi - lo) / self.n_div as f64;
            let cell = rng.random_range(0..self.n_div - 1);
            let cell_lo = lo + cell as f64 * d;
            let v = uniform_in(cell_lo, cell_lo + d, rng).min(hi).max(lo);
            result.set_value(&name, v)?;
        }
        Ok(result)
    }
}

/// Evaluates a pool of candidates up front and hands out the best of them
#[derive(Debug, Clone)]
pub struct BestOfSampling<T> {
    candidates: Vec<T>,
    next_index: usize,
}

impl<T: HyperCube> BestOfSampling<T> {
    pub fn new<F, E, A, R>(
        inner: &mut F,
        pool_size: usize,
        best_points: usize,
        evaluator: &mut E,
        fitness: &A,
        rng: &mut R,
    ) -> Result<Self>
    where
        F: CandidateFactory<T>,
        E: ObjectiveEvaluator<T>,
        A: FitnessAssignment<T> + ?Sized,
        R: Rng + ?Sized,
    {
        if pool_size < best_points {
            return Err(SceError::InvalidParameter(format!(
                "pool size {} must be >= the number of best points {}",
                pool_size, best_points
            )));
        }
        let mut pool = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let candidate = inner.create_random_candidate(rng)?;
            pool.push(evaluator.evaluate(&candidate)?);
        }
        let ranked = fitness.assign_sorted(&pool)?;
        let candidates = ranked.into_iter().take(best_points).map(|f| f.scored.into_point()).collect();
        Ok(Self { candidates, next_index: 0 })
    }

    pub fn remaining(&self) -> usize {
        self.candidates.len() - self.next_index
    }
}

impl<T: HyperCube> CandidateFactory<T> for BestOfSampling<T> {
    fn create_random_candidate<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> Result<T> {
        let c = self
            .candidates
            .get(self.next_index)
            .cloned()
            .ok_or(SceError::CandidatePoolExhausted(self.candidates.len()))?;
        self.next_index += 1;
        Ok(c)
    }
}
