// src/config/mod.rs

pub mod pi_config;

// Re-export main types for convenience
pub use pi_config::{PiConfig, TuningConfig};
