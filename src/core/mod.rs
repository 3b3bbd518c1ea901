//! Core Module - Scoring Engine
//!
//! Feature building, standardization, training, inference and explanation.

pub mod explainer;
pub mod features;
pub mod model;
pub mod standardizer;
pub mod trainer;

pub use explainer::*;
pub use features::*;
pub use model::*;
pub use standardizer::*;
pub use trainer::*;
