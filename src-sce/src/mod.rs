//! Shuffled Complex Evolution (SCE-UA) global optimizer in pure Rust
//!
//! A derivative-free optimizer for calibrating models over a bounded
//! parameter space, after Duan et al. (1993).
//!
//! Supported features:
//! - Box constrained, named parameters through the [`HyperCube`] trait
//! - Competitive complex evolution with reflection, contraction and random
//!   recovery, with option flags selecting the recovery strategy
//! - Trapezoidal rank-biased sub-complex sampling
//! - Single objective fitness, or Zitler-Thiele Pareto strength fitness
//! - Termination on shuffle count, coefficient of variation, marginal
//!   improvement or wall clock time
//! - Parallel evaluation with one evaluator clone per slice (rayon)
//! - Cooperative cancellation and seeded, thread count independent runs
//! - Optional event sinks, including a CSV recorder
//!
//! ```no_run
//! use ndarray::Array1;
//! use sceua::{
//!     ObjectiveFunctionEvaluator, ParameterSet, SceConfigBuilder, ShuffledComplexEvolution,
//!     UniformRandomSampling,
//! };
//!
//! let template = ParameterSet::from_bounds(&[(-5.0, 5.0), (-5.0, 5.0)]).unwrap();
//! let evaluator = ObjectiveFunctionEvaluator::minimize("sphere", |x: &Array1<f64>| x.dot(x));
//! let config = SceConfigBuilder::new().seed(42).build().unwrap();
//! let mut sce =
//!     ShuffledComplexEvolution::new(evaluator, UniformRandomSampling::new(template), config).unwrap();
//! let results = sce.evolve().unwrap();
//! println!("{}", results);
//! ```

#![allow(missing_docs)]

pub mod cancel;
pub mod candidates;
mod complex;
pub mod config;
pub mod discrete_sampler;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod fitness;
pub mod geometry;
pub mod hypercube;
pub mod options;
pub mod parallel_eval;
pub mod pareto;
pub mod recorder;
pub mod results;
pub mod rng_factory;
pub mod scores;
pub mod sink;
pub mod termination;

pub use cancel::CancellationToken;
pub use candidates::{BestOfSampling, CandidateFactory, LatinHypercubeSampling, UniformRandomSampling};
pub use config::{FitnessKind, SceConfig, SceConfigBuilder, SceParameters, SceSettings, TerminationConfig};
pub use engine::ShuffledComplexEvolution;
pub use error::{Result, SceError};
pub use evaluator::{ObjectiveEvaluator, ObjectiveFunctionEvaluator};
pub use fitness::{DefaultFitnessAssignment, FitnessAssignment, ZitlerThieleFitnessAssignment};
pub use hypercube::{Cloneable, Configuration, HyperCube, ParameterSet, ParameterizedSystem, Variable};
pub use options::SceOptions;
pub use parallel_eval::ParallelConfig;
pub use pareto::{ParetoComparer, ParetoRanking};
pub use recorder::{OptimizationRecord, OptimizationRecorder};
pub use results::OptimizationResults;
pub use rng_factory::RngFactory;
pub use scores::{FitnessAssignedScore, ObjectiveScore, ScoredPoint};
pub use sink::{EventSink, InMemoryEventSink, SinkEntry, Tags};
pub use termination::{
    AlwaysFalse, CoefficientOfVariation, MarginalImprovement, MaxShuffle, MaxWalltime, SceState,
    TerminationCondition,
};
