//! SCE parameters, run settings and the fluent configuration builder.
//!
//! [`SceParameters`] and [`SceSettings`] are plain serde structures that can be
//! read from JSON or YAML files; [`SceConfigBuilder`] assembles them with the
//! runtime collaborators (termination, fitness, sink) into a validated
//! [`SceConfig`].

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::{Result, SceError};
use crate::fitness::{DefaultFitnessAssignment, FitnessAssignment};
use crate::hypercube::HyperCube;
use crate::options::SceOptions;
use crate::parallel_eval::ParallelConfig;
use crate::sink::EventSink;
use crate::termination::{
	AlwaysFalse, CoefficientOfVariation, MarginalImprovement, MaxShuffle, MaxWalltime,
	TerminationCondition,
};

/// Algorithm parameters of the shuffled complex evolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceParameters {
	/// Number of complexes
	pub p: usize,
	/// Minimum number of complexes
	pub pmin: usize,
	/// Number of points per complex
	pub m: usize,
	/// Number of points per sub-complex
	pub q: usize,
	/// Number of geometric transformations per sub-complex
	pub alpha: usize,
	/// Number of evolution steps per complex between two shuffles
	pub beta: usize,
	/// Bound on the shuffle counter, used by the shuffle based termination.
	/// The counter starts at 1, so this allows `num_shuffle - 1` rounds.
	pub num_shuffle: usize,
	/// Trapezoidal density multiplier of the best rank, in [0, 2]
	pub trapezoidal_density: f64,
	pub reflection_ratio: f64,
	pub contraction_ratio: f64,
}

impl Default for SceParameters {
	fn default() -> Self {
		Self {
			p: 5,
			pmin: 5,
			m: 13,
			q: 7,
			alpha: 3,
			beta: 13,
			num_shuffle: 15,
			trapezoidal_density: 1.9,
			reflection_ratio: -1.0,
			contraction_ratio: 0.5,
		}
	}
}

impl SceParameters {
	/// Recommended parameters for `n` free parameters: `m = 2n + 1`,
	/// `q = max(m - 2, 2)`, `alpha = 1`, `beta = m`.
	pub fn for_problem_of_dimension(n: usize, num_shuffle: usize) -> Result<Self> {
		if n == 0 {
			return Err(SceError::InvalidParameter(
				"there must be at least one free parameter to calibrate".to_string(),
			));
		}
		let m = 2 * n + 1;
		Ok(Self { m, q: (m - 2).max(2), alpha: 1, beta: m, num_shuffle, ..Self::default() })
	}

	pub fn validate(&self) -> Result<()> {
		let fail = |msg: String| Err(SceError::InvalidParameter(msg));
		if self.p == 0 {
			return fail("p must be at least 1".to_string());
		}
		if self.m < 2 {
			return fail(format!("m must be at least 2, got {}", self.m));
		}
		if self.q < 2 {
			return fail(format!("q must be at least 2, got {}", self.q));
		}
		if self.q > self.m {
			return fail(format!("q ({}) must not exceed m ({})", self.q, self.m));
		}
		if self.pmin > self.p {
			return fail(format!("pmin ({}) must not exceed p ({})", self.pmin, self.p));
		}
		if self.alpha == 0 {
			return fail("alpha must be at least 1".to_string());
		}
		if self.beta == 0 {
			return fail("beta must be at least 1".to_string());
		}
		if !(0.0..=2.0).contains(&self.trapezoidal_density) {
			return fail(format!(
				"trapezoidal density {} must lie in [0, 2]",
				self.trapezoidal_density
			));
		}
		if !self.reflection_ratio.is_finite() || !self.contraction_ratio.is_finite() {
			return fail(format!(
				"reflection ratio {} and contraction ratio {} must be finite",
				self.reflection_ratio, self.contraction_ratio
			));
		}
		Ok(())
	}
}

/// Serializable description of a termination condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationConfig {
	MaxShuffle {
		max_shuffle: usize,
	},
	CoefficientOfVariation {
		threshold: f64,
		max_hours: Option<f64>,
		max_shuffle: usize,
	},
	MarginalImprovement {
		tolerance: f64,
		cutoff: usize,
		max_hours: Option<f64>,
	},
	MaxWalltime {
		max_hours: Option<f64>,
	},
	Never,
}

/// Hours to a duration; absent, non positive or non finite means no limit
pub(crate) fn hours(h: Option<f64>) -> Option<Duration> {
	h.filter(|h| *h > 0.0).and_then(|h| Duration::try_from_secs_f64(h * 3600.0).ok())
}

impl TerminationConfig {
	pub fn build<T: HyperCube>(&self) -> Box<dyn TerminationCondition<T>> {
		match *self {
			TerminationConfig::MaxShuffle { max_shuffle } => Box::new(MaxShuffle::new(max_shuffle)),
			TerminationConfig::CoefficientOfVariation { threshold, max_hours, max_shuffle } => {
				Box::new(CoefficientOfVariation::new(threshold, hours(max_hours), max_shuffle))
			}
			TerminationConfig::MarginalImprovement { tolerance, cutoff, max_hours } => {
				Box::new(MarginalImprovement::new(tolerance, cutoff, hours(max_hours)))
			}
			TerminationConfig::MaxWalltime { max_hours } => Box::new(MaxWalltime::new(hours(max_hours))),
			TerminationConfig::Never => Box::new(AlwaysFalse),
		}
	}
}

/// Fitness assignment selectable from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessKind {
	/// First objective, oriented
	#[default]
	Default,
	/// Zitler-Thiele Pareto strength
	ZitlerThiele,
}

/// Everything about a run that can live in a settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceSettings {
	pub parameters: SceParameters,
	pub options: SceOptions,
	pub seed: Option<u64>,
	pub termination: TerminationConfig,
	pub fitness: FitnessKind,
	pub parallel: ParallelConfig,
	pub disp: bool,
}

impl Default for SceSettings {
	fn default() -> Self {
		let parameters = SceParameters::default();
		let termination = TerminationConfig::MaxShuffle { max_shuffle: parameters.num_shuffle };
		Self {
			parameters,
			options: SceOptions::NONE,
			seed: None,
			termination,
			fitness: FitnessKind::Default,
			parallel: ParallelConfig::default(),
			disp: false,
		}
	}
}

impl SceSettings {
	/// Load from a `.json`, `.yaml` or `.yml` file
	pub fn from_path(path: &Path) -> Result<Self> {
		let text = fs::read_to_string(path)?;
		match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref() {
			Some("json") => Self::from_json_str(&text),
			Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
			_ => Err(SceError::Config(format!(
				"unsupported settings file extension: {}",
				path.display()
			))),
		}
	}

	pub fn from_json_str(text: &str) -> Result<Self> {
		serde_json::from_str(text).map_err(|e| SceError::Config(e.to_string()))
	}

	pub fn from_yaml_str(text: &str) -> Result<Self> {
		serde_yaml::from_str(text).map_err(|e| SceError::Config(e.to_string()))
	}

	pub fn to_json_string(&self) -> Result<String> {
		serde_json::to_string_pretty(self).map_err(|e| SceError::Config(e.to_string()))
	}
}

/// Validated configuration of one engine run
pub struct SceConfig<T> {
	pub parameters: SceParameters,
	pub options: SceOptions,
	pub seed: Option<u64>,
	/// Print per-shuffle progress
	pub disp: bool,
	pub parallel: ParallelConfig,
	pub termination: Box<dyn TerminationCondition<T>>,
	pub fitness: Arc<dyn FitnessAssignment<T>>,
	pub sink: Option<Arc<dyn EventSink<T>>>,
	pub cancellation: CancellationToken,
}

/// Fluent builder for `SceConfig`
pub struct SceConfigBuilder<T> {
	parameters: SceParameters,
	options: SceOptions,
	seed: Option<u64>,
	disp: bool,
	parallel: ParallelConfig,
	termination: Option<Box<dyn TerminationCondition<T>>>,
	fitness: Option<Arc<dyn FitnessAssignment<T>>>,
	sink: Option<Arc<dyn EventSink<T>>>,
	cancellation: Option<CancellationToken>,
}

impl<T: HyperCube + 'static> Default for SceConfigBuilder<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: HyperCube + 'static> SceConfigBuilder<T> {
	pub fn new() -> Self {
		Self {
			parameters: SceParameters::default(),
			options: SceOptions::NONE,
			seed: None,
			disp: false,
			parallel: ParallelConfig::default(),
			termination: None,
			fitness: None,
			sink: None,
			cancellation: None,
		}
	}
	pub fn from_settings(settings: &SceSettings) -> Self {
		let mut b = Self::new()
			.parameters(settings.parameters.clone())
			.options(settings.options)
			.disp(settings.disp)
			.parallel(settings.parallel.clone())
			.termination(settings.termination.build());
		b.seed = settings.seed;
		if settings.fitness == FitnessKind::ZitlerThiele {
			b = b.fitness(Arc::new(crate::fitness::ZitlerThieleFitnessAssignment::new()));
		}
		b
	}
	pub fn parameters(mut self, v: SceParameters) -> Self {
		self.parameters = v;
		self
	}
	pub fn options(mut self, v: SceOptions) -> Self {
		self.options = v;
		self
	}
	pub fn seed(mut self, v: u64) -> Self {
		self.seed = Some(v);
		self
	}
	pub fn disp(mut self, v: bool) -> Self {
		self.disp = v;
		self
	}
	pub fn parallel(mut self, v: ParallelConfig) -> Self {
		self.parallel = v;
		self
	}
	pub fn enable_parallel(mut self, enable: bool) -> Self {
		self.parallel.enabled = enable;
		self
	}
	pub fn parallel_threads(mut self, num_threads: usize) -> Self {
		self.parallel.num_threads = Some(num_threads);
		self
	}
	pub fn termination(mut self, v: Box<dyn TerminationCondition<T>>) -> Self {
		self.termination = Some(v);
		self
	}
	pub fn fitness(mut self, v: Arc<dyn FitnessAssignment<T>>) -> Self {
		self.fitness = Some(v);
		self
	}
	pub fn sink(mut self, v: Arc<dyn EventSink<T>>) -> Self {
		self.sink = Some(v);
		self
	}
	pub fn cancellation(mut self, v: CancellationToken) -> Self {
		self.cancellation = Some(v);
		self
	}
	/// Validate the parameters; termination defaults to the shuffle count
	pub fn build(self) -> Result<SceConfig<T>> {
		self.parameters.validate()?;
		let termination = match self.termination {
			Some(t) => t,
			None => Box::new(MaxShuffle::new(self.parameters.num_shuffle)),
		};
		Ok(SceConfig {
			parameters: self.parameters,
			options: self.options,
			seed: self.seed,
			disp: self.disp,
			parallel: self.parallel,
			termination,
			fitness: self.fitness.unwrap_or_else(|| Arc::new(DefaultFitnessAssignment)),
			sink: self.sink,
			cancellation: self.cancellation.unwrap_or_default(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hypercube::ParameterSet;

	#[test]
	fn test_defaults_are_valid() {
		let p = SceParameters::default();
		assert_eq!((p.p, p.pmin, p.m, p.q, p.alpha, p.beta), (5, 5, 13, 7, 3, 13));
		assert_eq!(p.trapezoidal_density, 1.9);
		assert_eq!(p.reflection_ratio, -1.0);
		assert_eq!(p.contraction_ratio, 0.5);
		assert!(p.validate().is_ok());
	}

	#[test]
	fn test_for_problem_of_dimension() {
		let p = SceParameters::for_problem_of_dimension(4, 20).unwrap();
		assert_eq!((p.m, p.q, p.alpha, p.beta, p.num_shuffle), (9, 7, 1, 9, 20));
		let p = SceParameters::for_problem_of_dimension(1, 5).unwrap();
		assert_eq!((p.m, p.q), (3, 2));
		assert!(SceParameters::for_problem_of_dimension(0, 5).is_err());
	}

	#[test]
	fn test_validation() {
		let base = SceParameters::default();
		let invalid = [
			SceParameters { m: 1, q: 1, ..base.clone() },
			SceParameters { q: 14, ..base.clone() },
			SceParameters { pmin: 6, ..base.clone() },
			SceParameters { q: 1, ..base.clone() },
			SceParameters { p: 0, pmin: 0, ..base.clone() },
			SceParameters { alpha: 0, ..base.clone() },
			SceParameters { beta: 0, ..base.clone() },
			SceParameters { trapezoidal_density: 2.1, ..base.clone() },
			SceParameters { trapezoidal_density: -0.1, ..base.clone() },
			SceParameters { reflection_ratio: f64::NAN, ..base.clone() },
			SceParameters { reflection_ratio: f64::NEG_INFINITY, ..base.clone() },
			SceParameters { contraction_ratio: f64::INFINITY, ..base.clone() },
			SceParameters { contraction_ratio: f64::NAN, ..base.clone() },
		];
		for p in &invalid {
			assert!(
				matches!(p.validate(), Err(SceError::InvalidParameter(_))),
				"accepted invalid parameters {:?}",
				p
			);
		}
	}

	#[test]
	fn test_settings_from_json_and_yaml() {
		let json = r#"{
			"parameters": { "p": 3, "pmin": 2, "m": 5, "q": 3 },
			"options": "rnd_in_sub_complex",
			"seed": 42,
			"termination": { "kind": "coefficient_of_variation", "threshold": 0.01, "max_hours": null, "max_shuffle": 50 }
		}"#;
		let s = SceSettings::from_json_str(json).unwrap();
		assert_eq!(s.parameters.p, 3);
		assert_eq!(s.parameters.alpha, 3);
		assert!(s.options.contains(SceOptions::RND_IN_SUB_COMPLEX));
		assert_eq!(s.seed, Some(42));
		assert!(matches!(s.termination, TerminationConfig::CoefficientOfVariation { max_shuffle: 50, .. }));

		let yaml = "parameters:\n  p: 2\n  pmin: 1\nfitness: zitler_thiele\ntermination:\n  kind: marginal_improvement\n  tolerance: 1.0e-6\n  cutoff: 5\n  max_hours: 0.5\n";
		let s = SceSettings::from_yaml_str(yaml).unwrap();
		assert_eq!(s.parameters.pmin, 1);
		assert_eq!(s.fitness, FitnessKind::ZitlerThiele);
		assert!(SceSettings::from_json_str("{ \"options\": \"bogus\" }").is_err());

		let back = SceSettings::from_json_str(&s.to_json_string().unwrap()).unwrap();
		assert_eq!(back, s);
	}

	#[test]
	fn test_hours() {
		assert_eq!(hours(Some(1.0)), Some(Duration::from_secs(3600)));
		assert_eq!(hours(Some(0.0)), None);
		assert_eq!(hours(Some(-2.0)), None);
		assert_eq!(hours(None), None);
	}

	#[test]
	fn test_builder_validates() {
		let bad = SceParameters { q: 20, ..SceParameters::default() };
		assert!(SceConfigBuilder::<ParameterSet>::new().parameters(bad).build().is_err());
		let cfg = SceConfigBuilder::<ParameterSet>::new().seed(3).disp(true).build().unwrap();
		assert_eq!(cfg.seed, Some(3));
		assert!(cfg.disp);
		assert!(!cfg.cancellation.is_cancelled());
	}
}
