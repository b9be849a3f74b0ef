// src/core/constants.rs
//
// Chudnovsky series constants:
//   1/pi = 12 * sum_{k>=0} (-1)^k (6k)! (A + B*k) / ((3k)! (k!)^3 C^(3k+3/2))
// The closing formula rearranges this to pi = P*(C/D)*sqrt(C) / (Q + A*P).

pub const A: u64 = 13591409;
pub const B: u64 = 545140134;
pub const C: u64 = 640320;
pub const D: u64 = 12;

/// Odd part of C; C = 2^6 * 3 * 5 * 23 * 29.
pub const C_ODD: u64 = 3 * 5 * 23 * 29;

/// log2(10), bits of working precision per requested decimal digit.
pub const BITS_PER_DIGIT: f64 = 3.32192809488736234787;

/// Decimal digits contributed by each series term.
pub const DIGITS_PER_ITER: f64 = 14.1816474627254776555;

/// f64 mantissa width, the precision floor for Newton seeds.
pub const DOUBLE_PREC: u64 = 53;
