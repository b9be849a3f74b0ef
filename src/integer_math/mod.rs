// src/integer_math/mod.rs

pub mod factor_sieve;
pub mod factorization;

// Re-export main types for convenience
pub use factor_sieve::{FactorSieve, SieveEntry};
pub use factorization::{FactorEntry, FactorScratch, Factorization};
