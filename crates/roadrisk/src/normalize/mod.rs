//! Raw accident table normalization.

mod engine;
mod operations;
pub mod temporal;

pub use engine::Normalizer;
pub use operations::{NormalizeReport, NormalizeStep, StepChange};
