// src/fixed_point/newton.rs
//
// Precision-doubling Newton iterations for the two expensive operations of
// the closing formula: a square root of a machine integer and a full
// division. Both seed at double precision and double the working precision
// every step; the correction term of each step only needs half the new
// precision, which halves the cost of the inner multiplications.

use num::{BigInt, One, Signed};

use crate::core::constants::DOUBLE_PREC;
use crate::fixed_point::fixed_point::FixedPoint;

/// Ascending per-step working precisions for a Newton run: the target,
/// repeatedly halved (rounding up) until at or below the double floor,
/// replayed in reverse. Intermediate steps land on their halving rounded
/// up to even; the last step is exactly the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecisionSchedule {
    pub steps: Vec<u64>,
}

impl PrecisionSchedule {
    pub fn build(target: u64) -> Self {
        let mut steps = Vec::new();
        let mut p = target;
        while p > DOUBLE_PREC {
            steps.push(p);
            p = (p + 1) / 2;
        }
        for s in steps.iter_mut().skip(1) {
            *s += *s & 1;
        }
        steps.reverse();
        PrecisionSchedule { steps }
    }
}

/// sqrt(x) to `prec` bits. Iterates on the reciprocal square root and
/// converts with a final direct step, avoiding a full-precision division.
pub fn sqrt_u64(x: u64, prec: u64) -> FixedPoint {
    if prec <= DOUBLE_PREC {
        return FixedPoint::from_f64((x as f64).sqrt());
    }
    let schedule = PrecisionSchedule::build(prec);
    let steps = &schedule.steps;

    let mut t1 = FixedPoint::from_f64(1.0 / (x as f64).sqrt());
    for &p in &steps[..steps.len() - 1] {
        // t1 <- t1 + t1*(1 - x*t1^2)/2, correction at half precision
        let mut t2 = FixedPoint::mul(&t1, &t1, p);
        t2 = FixedPoint::mul_u64(&t2, x, p);
        t2 = FixedPoint::sub_from_u64(1, &t2, p);
        t2.truncate(p / 2);
        t2.shr(1);
        t2 = FixedPoint::mul(&t2, &t1, p / 2);
        t1 = FixedPoint::add(&t1, &t2, p);
    }

    // r = x*t1, then r + t1*(x - r^2)/2 lands on sqrt(x) directly.
    let t2 = FixedPoint::mul_u64(&t1, x, prec / 2);
    let mut r = FixedPoint::mul(&t2, &t2, prec);
    r = FixedPoint::sub_from_u64(x, &r, prec);
    let mut c = FixedPoint::mul(&t1, &r, prec / 2);
    c.shr(1);
    FixedPoint::add(&c, &t2, prec)
}

/// y / x to `prec` bits via a reciprocal iteration on x.
pub fn div(y: &FixedPoint, x: &FixedPoint, prec: u64) -> FixedPoint {
    if prec <= DOUBLE_PREC {
        return FixedPoint::from_f64(y.to_f64() / x.to_f64());
    }
    let schedule = PrecisionSchedule::build(prec);
    let steps = &schedule.steps;

    let mut t1 = reciprocal_seed(x);
    for &p in &steps[..steps.len() - 1] {
        // t1 <- t1 + t1*(1 - x*t1), correction at half precision
        let mut t2 = FixedPoint::mul(x, &t1, p);
        t2 = FixedPoint::sub_from_u64(1, &t2, p);
        t2.truncate(p / 2);
        t2 = FixedPoint::mul(&t2, &t1, p / 2);
        t1 = FixedPoint::add(&t1, &t2, p);
    }

    // t2 = y*t1, then t2 + t1*(y - x*t2).
    let t2 = FixedPoint::mul(&t1, y, prec / 2);
    let mut r = FixedPoint::mul(x, &t2, prec);
    r = FixedPoint::sub(y, &r, prec);
    r = FixedPoint::mul(&t1, &r, prec / 2);
    FixedPoint::add(&t2, &r, prec)
}

/// 1/x at double precision. Computed by integer division of the mantissa;
/// an f64 seed would overflow for operands this large.
fn reciprocal_seed(x: &FixedPoint) -> FixedPoint {
    assert!(
        x.mantissa.is_positive(),
        "reciprocal seed requires a positive operand"
    );
    let s = x.mantissa.bits() + DOUBLE_PREC;
    let q = (BigInt::one() << s as usize) / &x.mantissa;
    FixedPoint {
        mantissa: q,
        exponent: -(s as i64) - x.exponent,
    }
}
