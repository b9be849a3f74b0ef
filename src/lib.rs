// src/lib.rs

pub mod config;
pub mod core;
pub mod fixed_point;
pub mod integer_math;
pub mod series;
