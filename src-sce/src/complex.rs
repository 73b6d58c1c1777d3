//! Competitive complex evolution (CCE): the inner search of a single complex
//! between two shuffles.

use std::slice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{trace, warn};
use rand::rngs::StdRng;

use crate::config::SceParameters;
use crate::discrete_sampler::DiscreteRandomNumberGenerator;
use crate::error::{Result, SceError};
use crate::evaluator::ObjectiveEvaluator;
use crate::fitness::FitnessAssignment;
use crate::geometry::{centroid, homothetic_transform, random_within_bounding_box};
use crate::hypercube::HyperCube;
use crate::options::SceOptions;
use crate::scores::{FitnessAssignedScore, ScoredPoint, sort_by_fitness};
use crate::sink::{CATEGORY, COMPLEX, EventSink, MESSAGE, Tags};
use crate::termination::{AlwaysFalse, MaxWalltime, SceState, TerminationCondition};

/// Read-only state shared by every complex of one shuffle
pub(crate) struct ComplexContext<'a, T> {
    pub params: &'a SceParameters,
    pub options: SceOptions,
    pub fitness: &'a dyn FitnessAssignment<T>,
    pub sink: Option<&'a dyn EventSink<T>>,
    pub cancel: &'a AtomicBool,
    /// Wall clock budget left to the run, if it has one
    pub remaining: Option<Duration>,
    pub shuffle: usize,
    pub tags: Tags,
}

impl<T> ComplexContext<'_, T> {
    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// Complex-local stop: the remaining wall clock budget, or never
fn local_termination<T>(remaining: Option<Duration>) -> Box<dyn TerminationCondition<T>> {
    match remaining {
        Some(r) => Box::new(MaxWalltime::new(Some(r))),
        None => Box::new(AlwaysFalse),
    }
}

/// Index of the worst point; the last one among equals
fn worst_index<T>(sub_complex: &[FitnessAssignedScore<T>]) -> usize {
    sub_complex
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.fitness.total_cmp(&b.1.fitness))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// One complex: `m` points evolved independently during a shuffle round
pub(crate) struct Complex<T> {
    id: String,
    points: Vec<ScoredPoint<T>>,
    rng: StdRng,
    sampler: DiscreteRandomNumberGenerator,
    evaluations: usize,
}

impl<T: HyperCube> Complex<T> {
    pub fn new(id: String, points: Vec<ScoredPoint<T>>, rng: StdRng, trapezoidal_density: f64) -> Result<Self> {
        let sampler = DiscreteRandomNumberGenerator::trapezoidal(trapezoidal_density, points.len())?;
        Ok(Self { id, points, rng, sampler, evaluations: 0 })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn into_points(self) -> Vec<ScoredPoint<T>> {
        self.points
    }

    /// Objective evaluations made by this complex
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Run up to `beta` evolution steps of `alpha` moves each
    pub fn evolve<E: ObjectiveEvaluator<T>>(&mut self, evaluator: &mut E, ctx: &ComplexContext<'_, T>) -> Result<()> {
        let mut local = local_termination::<T>(ctx.remaining);
        local.start();
        let state = SceState::new(ctx.shuffle);

        for _ in 0..ctx.params.beta {
            if ctx.is_cancelled() || local.is_finished(&state) {
                break;
            }
            let buffer = self.points.clone();
            let (mut sub_complex, left_out) = self.draw_sub_complex(&buffer, ctx)?;
            for _ in 0..ctx.params.alpha {
                if ctx.is_cancelled() || local.is_finished(&state) {
                    break;
                }
                sub_complex = self.step(sub_complex, &buffer, evaluator, ctx)?;
            }
            self.points = sub_complex.into_iter().map(|f| f.scored).chain(left_out).collect();
        }
        Ok(())
    }

    /// Draw `q` distinct ranks from the trapezoidal sampler. The selected points
    /// come in draw order, the left out ones in rank order.
    fn draw_sub_complex(
        &mut self,
        buffer: &[ScoredPoint<T>],
        ctx: &ComplexContext<'_, T>,
    ) -> Result<(Vec<FitnessAssignedScore<T>>, Vec<ScoredPoint<T>>)> {
        let ranked = ctx.fitness.assign_sorted(buffer)?;
        let n = ranked.len();
        let q = ctx.params.q.min(n);
        let selected: Vec<usize> = if q == n {
            (0..n).collect()
        } else {
            let mut selected = Vec::with_capacity(q);
            while selected.len() < q {
                let i = self.sampler.next_index(&mut self.rng);
                if i < n && !selected.contains(&i) {
                    selected.push(i);
                }
            }
            selected
        };
        let chosen: Vec<ScoredPoint<T>> = selected.iter().map(|&i| ranked[i].scored.clone()).collect();
        let left_out: Vec<ScoredPoint<T>> = ranked
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !selected.contains(i))
            .map(|(_, f)| f.scored)
            .collect();
        Ok((ctx.fitness.assign_fitness(&chosen)?, left_out))
    }

    /// One move: replace the worst point of the sub-complex
    fn step<E: ObjectiveEvaluator<T>>(
        &mut self,
        sub_complex: Vec<FitnessAssignedScore<T>>,
        buffer: &[ScoredPoint<T>],
        evaluator: &mut E,
        ctx: &ComplexContext<'_, T>,
    ) -> Result<Vec<FitnessAssignedScore<T>>> {
        let w = worst_index(&sub_complex);
        let worst = &sub_complex[w];
        self.report(ctx, slice::from_ref(&worst.scored), "Worst point in subcomplex");
        let without_worst: Vec<ScoredPoint<T>> = sub_complex
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != w)
            .map(|(_, f)| f.scored.clone())
            .collect();
        let refs: Vec<&T> = without_worst.iter().map(|s| s.point()).collect();
        let center = centroid(&refs)?;

        let outcome = match homothetic_transform(&center, worst.point(), ctx.params.reflection_ratio)? {
            Some(reflected) => {
                let (candidate, k) = self.evaluate_new_set(reflected, &without_worst, evaluator, ctx)?;
                if candidate[k].fitness <= worst.fitness {
                    self.report_new(ctx, &candidate[k], "Reflected point in subcomplex");
                    Some(candidate)
                } else {
                    self.report_message(ctx, "Reflected point in subcomplex - Failed");
                    self.contraction_or_random(&without_worst, worst, &center, buffer, evaluator, ctx)?
                }
            }
            None if ctx.options.contains(SceOptions::RND_IN_SUB_COMPLEX) => {
                let mut sub_points = refs.clone();
                sub_points.push(worst.point());
                if ctx.options.contains(SceOptions::REFLECTION_RANDOMIZATION) {
                    self.add_random_in_hypercube(&without_worst, &sub_points, evaluator, ctx)?
                } else {
                    self.partially_random_reflection(&without_worst, worst.point(), &center, &sub_points, evaluator, ctx)?
                }
            }
            None => {
                let complex_points: Vec<&T> = buffer.iter().map(|s| s.point()).collect();
                self.add_random_in_hypercube(&without_worst, &complex_points, evaluator, ctx)?
            }
        };

        match outcome {
            Some(next) => Ok(next),
            None => {
                warn!("complex {}: no feasible replacement for the worst point, keeping it", self.id);
                self.report_message(ctx, "No feasible replacement for the worst point");
                Ok(sub_complex)
            }
        }
    }

    /// Evaluate `point` and assign fitness over `without_worst + point`.
    ///
    /// Returns the new sub-complex and the position of the new point in it.
    fn evaluate_new_set<E: ObjectiveEvaluator<T>>(
        &mut self,
        point: T,
        without_worst: &[ScoredPoint<T>],
        evaluator: &mut E,
        ctx: &ComplexContext<'_, T>,
    ) -> Result<(Vec<FitnessAssignedScore<T>>, usize)> {
        let scored = evaluator.evaluate(&point)?;
        self.evaluations += 1;
        let mut candidate = without_worst.to_vec();
        candidate.push(scored);
        let new_index = candidate.len() - 1;
        let order = ctx.fitness.rank_fitness(&candidate)?;
        let position = order
            .iter()
            .position(|(i, _)| *i == new_index)
            .ok_or_else(|| SceError::Evaluation("fitness assignment dropped the new point".to_string()))?;
        let assigned = order.into_iter().map(|(i, f)| FitnessAssignedScore::new(candidate[i].clone(), f)).collect();
        Ok((assigned, position))
    }

    fn contraction_or_random<E: ObjectiveEvaluator<T>>(
        &mut self,
        without_worst: &[ScoredPoint<T>],
        worst: &FitnessAssignedScore<T>,
        center: &T,
        buffer: &[ScoredPoint<T>],
        evaluator: &mut E,
        ctx: &ComplexContext<'_, T>,
    ) -> Result<Option<Vec<FitnessAssignedScore<T>>>> {
        match homothetic_transform(center, worst.point(), ctx.params.contraction_ratio)? {
            Some(contracted) => {
                let (candidate, k) = self.evaluate_new_set(contracted, without_worst, evaluator, ctx)?;
                if candidate[k].fitness <= worst.fitness {
                    self.report_new(ctx, &candidate[k], "Contracted point in subcomplex");
                    return Ok(Some(candidate));
                }
                self.report_message(ctx, "Contracted point in subcomplex - Failed");
            }
            None => self.report_message(ctx, "Contracted point unfeasible"),
        }
        let bounds: Vec<&T> = if ctx.options.contains(SceOptions::RANDOM_IN_COMPLEX) {
            buffer.iter().map(|s| s.point()).collect()
        } else {
            without_worst.iter().map(|s| s.point()).chain([worst.point()]).collect()
        };
        self.add_random_in_hypercube(without_worst, &bounds, evaluator, ctx)
    }

    /// Uniform point in the bounding box of `bounds`; `None` when the box is infeasible
    fn add_random_in_hypercube<E: ObjectiveEvaluator<T>>(
        &mut self,
        without_worst: &[ScoredPoint<T>],
        bounds: &[&T],
        evaluator: &mut E,
        ctx: &ComplexContext<'_, T>,
    ) -> Result<Option<Vec<FitnessAssignedScore<T>>>> {
        let point = match random_within_bounding_box(bounds, &mut self.rng) {
            Ok(p) => p,
            Err(SceError::InfeasibleBoundingBox { name, min, max }) => {
                trace!("complex {}: bounding box infeasible on {} [{}, {}]", self.id, name, min, max);
                self.report_message(ctx, "Random point within hypercube bounds is unfeasible");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let (candidate, k) = self.evaluate_new_set(point, without_worst, evaluator, ctx)?;
        self.report_new(ctx, &candidate[k], "Adding a random point in hypercube");
        Ok(Some(candidate))
    }

    /// Reflection through the centroid, with the coordinates falling outside
    /// the bounds replaced by a random draw in the sub-complex bounding box
    fn partially_random_reflection<E: ObjectiveEvaluator<T>>(
        &mut self,
        without_worst: &[ScoredPoint<T>],
        worst: &T,
        center: &T,
        sub_points: &[&T],
        evaluator: &mut E,
        ctx: &ComplexContext<'_, T>,
    ) -> Result<Option<Vec<FitnessAssignedScore<T>>>> {
        let random = match random_within_bounding_box(sub_points, &mut self.rng) {
            Ok(p) => p,
            Err(SceError::InfeasibleBoundingBox { .. }) => {
                self.report_message(ctx, "Random point within hypercube bounds is unfeasible");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let mut point = worst.clone();
        for name in point.variable_names() {
            let value = 2.0 * center.value(&name)? - worst.value(&name)?;
            if value < worst.min_value(&name)? || value > worst.max_value(&name)? {
                point.set_value(&name, random.value(&name)?)?;
            } else {
                point.set_value(&name, value)?;
            }
        }
        let (candidate, k) = self.evaluate_new_set(point, without_worst, evaluator, ctx)?;
        self.report_new(ctx, &candidate[k], "Adding a partially random point");
        Ok(Some(candidate))
    }

    /// Lowest fitness point of the complex
    pub fn best(&self, fitness: &dyn FitnessAssignment<T>) -> Result<Option<ScoredPoint<T>>> {
        let mut assigned = fitness.assign_fitness(&self.points)?;
        sort_by_fitness(&mut assigned);
        Ok(assigned.into_iter().next().map(|f| f.scored))
    }

    fn tags(&self, ctx: &ComplexContext<'_, T>, message: &str) -> Tags {
        ctx.tags
            .clone()
            .with(CATEGORY, format!("Complex No {}", self.id))
            .with(COMPLEX, &self.id)
            .with(MESSAGE, message)
    }

    fn report(&self, ctx: &ComplexContext<'_, T>, points: &[ScoredPoint<T>], message: &str) {
        if let Some(sink) = ctx.sink {
            sink.write_scores(points, &self.tags(ctx, message));
        }
    }

    fn report_new(&self, ctx: &ComplexContext<'_, T>, new_point: &FitnessAssignedScore<T>, message: &str) {
        trace!("complex {}: {} (fitness {:.6e})", self.id, message, new_point.fitness);
        self.report(ctx, slice::from_ref(&new_point.scored), message);
    }

    fn report_message(&self, ctx: &ComplexContext<'_, T>, message: &str) {
        trace!("complex {}: {}", self.id, message);
        if let Some(sink) = ctx.sink {
            sink.write_message(message, &self.tags(ctx, message));
        }
    }
}
