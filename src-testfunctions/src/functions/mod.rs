//! Test function implementations organized by category
//!
//! - `unimodal`: single optimum, used for convergence checks
//! - `multimodal`: many local minima, used for global search checks
//! - `multiobjective`: vector valued functions with a known Pareto front

pub mod multimodal;
pub mod multiobjective;
pub mod unimodal;

pub use multimodal::*;
pub use multiobjective::*;
pub use unimodal::*;
