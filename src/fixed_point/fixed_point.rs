// src/fixed_point/fixed_point.rs
//
// Arbitrary-precision fixed-point value: mantissa * 2^exponent with the
// mantissa held as a BigInt. Precision is explicit per operation; every
// result is truncated to the requested number of significant bits, so the
// caller controls exactly how much work each step performs.

use num::{BigInt, Float, Signed, ToPrimitive, Zero};

/// Extra mantissa bits kept on operands and alignment so truncation noise
/// stays out of the requested precision.
const GUARD_BITS: u64 = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedPoint {
    pub mantissa: BigInt,
    pub exponent: i64,
}

fn clip(mantissa: &BigInt, exponent: i64, keep: u64) -> (BigInt, i64) {
    let bits = mantissa.bits();
    if bits > keep {
        let shift = (bits - keep) as usize;
        (mantissa >> shift, exponent + shift as i64)
    } else {
        (mantissa.clone(), exponent)
    }
}

impl FixedPoint {
    pub fn from_u64(x: u64) -> Self {
        FixedPoint {
            mantissa: BigInt::from(x),
            exponent: 0,
        }
    }

    pub fn from_f64(x: f64) -> Self {
        let (mantissa, exponent, sign) = Float::integer_decode(x);
        let mut m = BigInt::from(mantissa);
        if sign < 0 {
            m = -m;
        }
        FixedPoint {
            mantissa: m,
            exponent: exponent as i64,
        }
    }

    /// Converts an integer, truncating the mantissa to `prec` bits.
    pub fn from_bigint(n: BigInt, prec: u64) -> Self {
        let mut f = FixedPoint {
            mantissa: n,
            exponent: 0,
        };
        f.truncate(prec);
        f
    }

    /// Truncates the mantissa in place to at most `prec` significant bits.
    pub fn truncate(&mut self, prec: u64) {
        let bits = self.mantissa.bits();
        if bits > prec {
            let shift = (bits - prec) as usize;
            self.mantissa >>= shift;
            self.exponent += shift as i64;
        }
    }

    pub fn truncated(&self, prec: u64) -> Self {
        let mut r = self.clone();
        r.truncate(prec);
        r
    }

    /// Exact division by 2^n.
    pub fn shr(&mut self, n: u64) {
        self.exponent -= n as i64;
    }

    pub fn mul(a: &FixedPoint, b: &FixedPoint, prec: u64) -> FixedPoint {
        let keep = prec + GUARD_BITS;
        let (ma, ea) = clip(&a.mantissa, a.exponent, keep);
        let (mb, eb) = clip(&b.mantissa, b.exponent, keep);
        let mut r = FixedPoint {
            mantissa: ma * mb,
            exponent: ea + eb,
        };
        r.truncate(prec);
        r
    }

    pub fn mul_u64(a: &FixedPoint, x: u64, prec: u64) -> FixedPoint {
        let (ma, ea) = clip(&a.mantissa, a.exponent, prec + GUARD_BITS);
        let mut r = FixedPoint {
            mantissa: ma * x,
            exponent: ea,
        };
        r.truncate(prec);
        r
    }

    pub fn add(a: &FixedPoint, b: &FixedPoint, prec: u64) -> FixedPoint {
        if a.mantissa.is_zero() {
            return b.truncated(prec);
        }
        if b.mantissa.is_zero() {
            return a.truncated(prec);
        }
        let top_a = a.exponent + a.mantissa.bits() as i64;
        let top_b = b.exponent + b.mantissa.bits() as i64;
        // When the magnitudes are too far apart the smaller operand cannot
        // reach the kept bits of the result.
        if (top_a - top_b).unsigned_abs() > prec + GUARD_BITS {
            let hi = if top_a >= top_b { a } else { b };
            return hi.truncated(prec);
        }
        let e = a.exponent.min(b.exponent);
        let ma = &a.mantissa << ((a.exponent - e) as usize);
        let mb = &b.mantissa << ((b.exponent - e) as usize);
        let mut r = FixedPoint {
            mantissa: ma + mb,
            exponent: e,
        };
        r.truncate(prec);
        r
    }

    pub fn sub(a: &FixedPoint, b: &FixedPoint, prec: u64) -> FixedPoint {
        let nb = FixedPoint {
            mantissa: -&b.mantissa,
            exponent: b.exponent,
        };
        Self::add(a, &nb, prec)
    }

    pub fn sub_from_u64(x: u64, b: &FixedPoint, prec: u64) -> FixedPoint {
        Self::sub(&Self::from_u64(x), b, prec)
    }

    pub fn to_f64(&self) -> f64 {
        let bits = self.mantissa.bits();
        let (m, e) = if bits > 64 {
            let shift = (bits - 64) as usize;
            ((&self.mantissa >> shift).to_f64(), self.exponent + shift as i64)
        } else {
            (self.mantissa.to_f64(), self.exponent)
        };
        m.unwrap_or(f64::NAN) * (2.0f64).powi(e as i32)
    }

    /// Floor of value * 2^scale_bits as an integer.
    pub fn scaled(&self, scale_bits: i64) -> BigInt {
        let e = self.exponent + scale_bits;
        if e >= 0 {
            &self.mantissa << e as usize
        } else {
            &self.mantissa >> (-e) as usize
        }
    }

    /// Renders `significant` decimal digits as "d.ddd". The value must be
    /// positive and lie in [1, 10).
    pub fn to_decimal(&self, significant: usize) -> String {
        assert!(significant >= 1, "at least one digit must be rendered");
        assert!(
            self.mantissa.is_positive(),
            "decimal rendering requires a positive value"
        );
        let pow10 = BigInt::from(10u32).pow((significant - 1) as u32);
        let scaled = FixedPoint {
            mantissa: &self.mantissa * pow10,
            exponent: self.exponent,
        }
        .scaled(0);
        let s = scaled.to_string();
        assert_eq!(
            s.len(),
            significant,
            "value outside [1, 10) cannot be rendered to {} digits",
            significant
        );
        let (head, tail) = s.split_at(1);
        format!("{}.{}", head, tail)
    }
}
