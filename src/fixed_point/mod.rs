// src/fixed_point/mod.rs

pub mod fixed_point;
pub mod newton;

// Re-export main types for convenience
pub use fixed_point::FixedPoint;
pub use newton::PrecisionSchedule;
