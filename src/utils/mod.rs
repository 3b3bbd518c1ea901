//! Utils Module - Helper Functions & Shared Utilities

pub mod constants;

pub use constants::*;
