// src/core/mod.rs

pub mod constants;
pub mod pi;

// Re-export main types for convenience
pub use pi::{terms_for_digits, PiComputation};
