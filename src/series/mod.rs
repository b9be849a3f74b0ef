// src/series/mod.rs

pub mod binary_split;
pub mod reduction;

// Re-export main types for convenience
pub use binary_split::{depth_for_terms, SeriesTriplet, SplitWorker};
pub use reduction::{evaluate, ReductionOutcome};
