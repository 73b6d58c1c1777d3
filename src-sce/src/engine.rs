//! Shuffled Complex Evolution (SCE-UA) engine.
//!
//! The engine samples `p * m` candidates, ranks them by fitness and deals them
//! into `p` complexes (complex `i` gets ranks `i`, `i + p`, ...). Each complex
//! evolves on its own for `beta` steps, then all points are pooled, ranked
//! and dealt again ("shuffled") until the termination condition holds or the
//! run is cancelled.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::cancel::CancellationToken;
use crate::candidates::CandidateFactory;
use crate::complex::{Complex, ComplexContext};
use crate::config::SceConfig;
use crate::error::{Result, SceError};
use crate::evaluator::ObjectiveEvaluator;
use crate::hypercube::HyperCube;
use crate::parallel_eval::{evaluate_population, map_sliced};
use crate::results::OptimizationResults;
use crate::rng_factory::RngFactory;
use crate::scores::{FitnessAssignedScore, ScoredPoint};
use crate::sink::{MESSAGE, SHUFFLE, Tags};
use crate::termination::SceState;

/// Environment variable enabling timing output on stderr
pub const TIMING_ENV: &str = "SCEUA_TIMING";

pub struct ShuffledComplexEvolution<T, E, F> {
	evaluator: E,
	factory: F,
	config: SceConfig<T>,
	rng_factory: RngFactory,
	/// Current number of complexes
	p: usize,
	current_shuffle: usize,
	population_at_shuffling: Option<Vec<FitnessAssignedScore<T>>>,
	evaluations: usize,
	evolved: bool,
}

impl<T, E, F> ShuffledComplexEvolution<T, E, F>
where
	T: HyperCube + 'static,
	E: ObjectiveEvaluator<T>,
	F: CandidateFactory<T>,
{
	pub fn new(evaluator: E, factory: F, config: SceConfig<T>) -> Result<Self> {
		config.parameters.validate()?;
		let rng_factory = RngFactory::new(config.seed);
		let p = config.parameters.p;
		Ok(Self {
			evaluator,
			factory,
			config,
			rng_factory,
			p,
			current_shuffle: 1,
			population_at_shuffling: None,
			evaluations: 0,
			evolved: false,
		})
	}

	/// Shuffle counter: 1 before the first round, incremented after each
	/// round, so `current_shuffle() - 1` rounds have completed
	pub fn current_shuffle(&self) -> usize {
		self.current_shuffle
	}

	/// Population ranked by fitness at the last shuffle
	pub fn population_at_shuffling(&self) -> Option<&[FitnessAssignedScore<T>]> {
		self.population_at_shuffling.as_deref()
	}

	pub fn complex_count(&self) -> usize {
		self.p
	}

	/// Request a cooperative stop; safe to call repeatedly
	pub fn cancel(&self) {
		self.config.cancellation.cancel();
	}

	/// Token sharing the engine's cancellation flag, e.g. for a signal handler
	pub fn cancellation_token(&self) -> CancellationToken {
		self.config.cancellation.clone()
	}

	/// Run the optimisation. Can only be called once per engine.
	pub fn evolve(&mut self) -> Result<OptimizationResults<T>> {
		if self.evolved {
			return Err(SceError::AlreadyEvolved);
		}
		self.evolved = true;
		let started = Instant::now();
		let timing_enabled = std::env::var(TIMING_ENV).map(|v| v != "0").unwrap_or(false);

		// Configure global rayon thread pool once if requested
		if let Some(n) = self.config.parallel.num_threads {
			// Ignore error if global pool already set
			let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
		}

		let params = self.config.parameters.clone();
		if self.config.disp {
			eprintln!(
				"SCE Init: p={} (pmin={}), m={}, q={}, alpha={}, beta={}, options={}",
				params.p, params.pmin, params.m, params.q, params.alpha, params.beta, self.config.options
			);
		}
		self.config.termination.start();

		let t_init0 = Instant::now();
		let npop = self.p * params.m;
		let mut rng = self.rng_factory.create_rng();
		let mut candidates = Vec::with_capacity(npop);
		for _ in 0..npop {
			candidates.push(self.factory.create_random_candidate(&mut rng)?);
		}
		let scored = evaluate_population(
			candidates,
			&mut self.evaluator,
			&self.config.parallel,
			self.config.cancellation.flag(),
		)?;
		self.evaluations += scored.len();
		self.write_scores(&scored, "Initial Population", "Initial Population");
		if timing_enabled {
			eprintln!("TIMING init: eval={:.3} ms", t_init0.elapsed().as_secs_f64() * 1e3);
		}

		let mut ranked =
			if scored.is_empty() { Vec::new() } else { self.config.fitness.assign_sorted(&scored)? };
		if scored.len() < npop {
			info!("SCE cancelled during the initial evaluation ({} of {} points)", scored.len(), npop);
			return Ok(self.results(ranked, started.elapsed()));
		}
		if let Some(best) = ranked.first() {
			debug!("SCE initial best fitness {:.6e}", best.fitness);
		}

		let mut complexes = self.partition(&ranked, true)?;
		let mut finished = self.config.termination.is_finished(&SceState::new(self.current_shuffle));
		if finished {
			self.log_termination();
		}

		while !finished && !self.config.cancellation.is_cancelled() {
			let t_shuffle0 = Instant::now();
			let shuffle_tag = format!("{:03}", self.current_shuffle);
			let ctx = ComplexContext {
				params: &params,
				options: self.config.options,
				fitness: self.config.fitness.as_ref(),
				sink: self.config.sink.as_deref(),
				cancel: self.config.cancellation.flag(),
				remaining: self.config.termination.remaining_walltime(),
				shuffle: self.current_shuffle,
				tags: Tags::new().with(SHUFFLE, &shuffle_tag),
			};
			let evolved = map_sliced(complexes, &mut self.evaluator, &self.config.parallel, |e, mut c| {
				if !ctx.cancel.load(std::sync::atomic::Ordering::SeqCst) {
					c.evolve(e, &ctx)?;
				}
				Ok(c)
			})?;

			let mut population: Vec<ScoredPoint<T>> = Vec::with_capacity(npop);
			for c in evolved {
				self.evaluations += c.evaluations();
				if let Some(best) = c.best(self.config.fitness.as_ref())? {
					self.write_scores(std::slice::from_ref(&best), "Best point in complex", &format!("Complex No {}", c.id()));
				}
				population.extend(c.into_points());
			}
			let shuffle_msg = format!("Shuffling No {}", shuffle_tag);
			self.write_scores(&population, &shuffle_msg, &shuffle_msg);

			ranked = self.config.fitness.assign_sorted(&population)?;
			if let Some(best) = ranked.first() {
				self.write_scores(std::slice::from_ref(&best.scored), "Best point in shuffle", &shuffle_msg);
			}
			let best_f = ranked.first().map(|b| b.fitness).unwrap_or(f64::NAN);
			debug!("SCE shuffle {} best fitness {:.6e}", self.current_shuffle, best_f);
			if self.config.disp {
				eprintln!("SCE shuffle {:4}  best_f={:.6e}  complexes={}", self.current_shuffle, best_f, self.p);
			}
			if timing_enabled {
				eprintln!(
					"TIMING shuffle {}: {:.3} ms",
					self.current_shuffle,
					t_shuffle0.elapsed().as_secs_f64() * 1e3
				);
			}
			self.current_shuffle += 1;

			if self.config.cancellation.is_cancelled() {
				self.population_at_shuffling = Some(ranked.clone());
				break;
			}
			complexes = self.partition(&ranked, false)?;
			self.population_at_shuffling = Some(ranked.clone());
			let state = SceState::new(self.current_shuffle).with_population(&ranked);
			finished = self.config.termination.is_finished(&state);
			if finished {
				self.log_termination();
			}
		}

		if self.config.cancellation.is_cancelled() {
			info!("SCE cancelled after {} shuffles", self.completed_shuffles());
		}
		Ok(self.results(ranked, started.elapsed()))
	}

	/// Deal ranked points into complexes; every partition after the first
	/// drops one complex while above `pmin`.
	fn partition(&mut self, ranked: &[FitnessAssignedScore<T>], first: bool) -> Result<Vec<Complex<T>>> {
		let params = &self.config.parameters;
		if !first && self.p > params.pmin {
			self.p -= 1;
		}
		let (p, m) = (self.p, params.m);
		if ranked.len() < p * m {
			return Err(SceError::InvalidParameter(format!(
				"population of {} points cannot fill {} complexes of {} points",
				ranked.len(),
				p,
				m
			)));
		}
		// the parent factory advances once per round whatever p is
		let mut round_rngs = self.rng_factory.create_factory();
		let mut complexes = Vec::with_capacity(p);
		for a in 0..p {
			let points: Vec<ScoredPoint<T>> = (0..m).map(|k| ranked[a + p * k].scored.clone()).collect();
			let id = format!("{:03}_{}", self.current_shuffle, a + 1);
			complexes.push(Complex::new(id, points, round_rngs.create_rng(), params.trapezoidal_density)?);
		}
		Ok(complexes)
	}

	fn results(&self, ranked: Vec<FitnessAssignedScore<T>>, elapsed: Duration) -> OptimizationResults<T> {
		OptimizationResults::new(
			ranked,
			self.completed_shuffles(),
			self.evaluations,
			self.config.cancellation.is_cancelled(),
			elapsed,
		)
	}

	fn completed_shuffles(&self) -> usize {
		self.current_shuffle.saturating_sub(1)
	}

	fn log_termination(&self) {
		let msg = format!("Termination condition is met after {} shuffles", self.completed_shuffles());
		info!("{}", msg);
		if let Some(sink) = &self.config.sink {
			sink.write_message(&msg, &Tags::category("Termination condition").with(MESSAGE, "Termination condition"));
		}
	}

	fn write_scores(&self, scores: &[ScoredPoint<T>], message: &str, category: &str) {
		if let Some(sink) = &self.config.sink {
			sink.write_scores(scores, &Tags::category(category).with(MESSAGE, message));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::candidates::UniformRandomSampling;
	use crate::config::{SceConfigBuilder, SceParameters};
	use crate::evaluator::ObjectiveFunctionEvaluator;
	use crate::hypercube::ParameterSet;
	use crate::termination::MaxShuffle;
	use ndarray::Array1;

	fn engine(
		params: SceParameters,
		max_shuffle: usize,
	) -> ShuffledComplexEvolution<ParameterSet, ObjectiveFunctionEvaluator, UniformRandomSampling<ParameterSet>> {
		let eval = ObjectiveFunctionEvaluator::minimize("sphere", |x: &Array1<f64>| x.dot(x));
		let factory = UniformRandomSampling::new(ParameterSet::from_bounds(&[(-5.0, 5.0), (-5.0, 5.0)]).unwrap());
		let config = SceConfigBuilder::new()
			.parameters(params)
			.seed(17)
			.termination(Box::new(MaxShuffle::new(max_shuffle)))
			.build()
			.unwrap();
		ShuffledComplexEvolution::new(eval, factory, config).unwrap()
	}

	#[test]
	fn test_evolve_only_once() {
		let mut e = engine(SceParameters { p: 2, pmin: 2, m: 5, q: 3, alpha: 1, beta: 5, ..SceParameters::default() }, 2);
		assert!(e.evolve().is_ok());
		assert!(matches!(e.evolve(), Err(SceError::AlreadyEvolved)));
	}

	#[test]
	fn test_complex_count_shrinks_to_pmin() {
		let params = SceParameters { p: 5, pmin: 2, m: 5, q: 3, alpha: 1, beta: 5, ..SceParameters::default() };
		let mut e = engine(params, 4);
		let r = e.evolve().unwrap();
		assert_eq!(e.current_shuffle(), 4);
		assert_eq!(r.shuffles, 3);
		assert_eq!(e.complex_count(), 2);
		// the last shuffle aggregated the 3 complexes dealt before it
		assert_eq!(r.len(), 3 * 5);
		assert_eq!(e.population_at_shuffling().map(|p| p.len()), Some(15));
	}

	#[test]
	fn test_zero_shuffle_returns_initial_population() {
		let params = SceParameters { p: 2, pmin: 2, m: 5, q: 3, alpha: 1, beta: 5, ..SceParameters::default() };
		for max_shuffle in [0, 1] {
			let mut e = engine(params.clone(), max_shuffle);
			let r = e.evolve().unwrap();
			assert_eq!(r.shuffles, 0);
			assert_eq!(r.evaluations, 10);
			assert_eq!(r.len(), 10);
			assert_eq!(e.current_shuffle(), 1);
			assert!(e.population_at_shuffling().is_none());
		}
	}

	#[test]
	fn test_max_shuffle_two_runs_one_round() {
		let params = SceParameters { p: 2, pmin: 2, m: 5, q: 3, alpha: 1, beta: 5, ..SceParameters::default() };
		let mut e = engine(params, 2);
		let r = e.evolve().unwrap();
		assert_eq!(r.shuffles, 1);
		assert_eq!(e.current_shuffle(), 2);
		assert!(r.evaluations > 10);
		assert_eq!(e.population_at_shuffling().map(|p| p.len()), Some(10));
	}

	#[test]
	fn test_cancel_before_evolve() {
		let params = SceParameters { p: 2, pmin: 2, m: 5, q: 3, alpha: 1, beta: 5, ..SceParameters::default() };
		let mut e = engine(params, 10);
		e.cancellation_token().cancel();
		let r = e.evolve().unwrap();
		assert!(r.cancelled);
		assert!(r.is_empty());
		assert_eq!(r.shuffles, 0);
	}
}
