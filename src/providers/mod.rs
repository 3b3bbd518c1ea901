//! Providers Module - Storage Boundary
//!
//! Loan rows in, predictions and model artifacts out.

pub mod model_store;
pub mod repository;
pub mod synth;

pub use model_store::*;
pub use repository::*;
pub use synth::*;
