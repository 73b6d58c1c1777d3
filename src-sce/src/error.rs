//! Error type shared by every part of the SCE engine

/// Errors raised by the optimiser, its configuration and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum SceError {
    #[error("invalid SCE parameter: {0}")]
    InvalidParameter(String),

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("value {value} for variable '{name}' is outside [{min}, {max}]")]
    OutOfBounds { name: String, value: f64, min: f64, max: f64 },

    #[error("cannot compute {0} of an empty set of points")]
    EmptyPoints(&'static str),

    #[error("impossible to generate a random value for variable '{name}': min={min}, max={max}")]
    InfeasibleBoundingBox { name: String, min: f64, max: f64 },

    #[error("invalid discrete probability density: {0}")]
    InvalidDensity(String),

    #[error("pareto ranking produced an empty non-dominated front from {remaining} points")]
    ParetoInvariant { remaining: usize },

    #[error("objective evaluation failed: {0}")]
    Evaluation(String),

    #[error("candidate pool exhausted after {0} points")]
    CandidatePoolExhausted(usize),

    #[error("evolve() can only be called once per engine instance")]
    AlreadyEvolved,

    #[error("configuration file error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SceError>;
