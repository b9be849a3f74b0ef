// tests/newton_tests.rs
//
// Precision checks for the Newton square root and division against exact
// big-integer references. The iterations double precision per step and
// truncate rather than round, so results are compared to within a small
// number of final-bit ulps.

use chudnovsky::fixed_point::fixed_point::FixedPoint;
use chudnovsky::fixed_point::newton;
use num::{BigInt, One};

#[cfg(test)]
mod newton_tests {
    use super::*;

    /// floor(sqrt(x) * 2^prec), computed exactly.
    fn sqrt_reference(x: u64, prec: u64) -> BigInt {
        (BigInt::from(x) << (2 * prec as usize)).sqrt()
    }

    fn assert_close(actual: BigInt, reference: BigInt, tolerance: BigInt, what: &str) {
        let diff = if actual >= reference {
            &actual - &reference
        } else {
            &reference - &actual
        };
        assert!(
            diff <= tolerance,
            "{}: |{} - {}| = {} exceeds {}",
            what,
            actual,
            reference,
            diff,
            tolerance
        );
    }

    #[test]
    fn test_sqrt_small_precision_uses_the_seed() {
        let root = newton::sqrt_u64(2, 40);
        assert!((root.to_f64() - 2f64.sqrt()).abs() < 1e-11);
    }

    #[test]
    fn test_sqrt_at_the_seed_boundary() {
        for prec in [53, 54, 60] {
            let root = newton::sqrt_u64(640320, prec);
            assert_close(
                root.scaled(prec as i64),
                sqrt_reference(640320, prec),
                BigInt::from(1u64 << 13),
                &format!("sqrt(640320) at {} bits", prec),
            );
        }
    }

    #[test]
    fn test_sqrt_doubling_reaches_high_precision() {
        for prec in [100, 347, 1000, 4321] {
            let root = newton::sqrt_u64(640320, prec);
            assert_close(
                root.scaled(prec as i64),
                sqrt_reference(640320, prec),
                BigInt::from(1u64 << 13),
                &format!("sqrt(640320) at {} bits", prec),
            );
        }
    }

    #[test]
    fn test_sqrt_of_a_perfect_square() {
        let root = newton::sqrt_u64(4, 500);
        assert_close(
            root.scaled(500),
            BigInt::from(2u32) << 500usize,
            BigInt::from(16u32),
            "sqrt(4) at 500 bits",
        );
    }

    #[test]
    fn test_div_small_precision_uses_the_seed() {
        let y = FixedPoint::from_f64(3.0);
        let x = FixedPoint::from_f64(7.0);
        let quotient = newton::div(&y, &x, 40);
        assert!((quotient.to_f64() - 3.0 / 7.0).abs() < 1e-11);
    }

    #[test]
    fn test_div_of_one_by_three() {
        let prec = 200u64;
        let y = FixedPoint::from_u64(1);
        let x = FixedPoint::from_u64(3);
        let quotient = newton::div(&y, &x, prec);
        assert_close(
            quotient.scaled(prec as i64),
            (BigInt::one() << prec as usize) / 3u64,
            BigInt::from(16u32),
            "1/3 at 200 bits",
        );
    }

    #[test]
    fn test_div_matches_integer_division() {
        // Operands stay under every tested precision so the fixed-point
        // inputs are exact and the reference is a plain integer quotient.
        let yv = (BigInt::one() << 49usize) + 999u64;
        let xv = (BigInt::one() << 50usize) + 12345u64;
        for prec in [54u64, 60, 100, 347, 2048] {
            let y = FixedPoint::from_bigint(yv.clone(), prec);
            let x = FixedPoint::from_bigint(xv.clone(), prec);
            let quotient = newton::div(&y, &x, prec);
            let reference = (&yv << prec as usize) / &xv;
            assert_close(
                quotient.scaled(prec as i64),
                reference,
                BigInt::from(16u32),
                &format!("integer quotient at {} bits", prec),
            );
        }
    }

    #[test]
    fn test_div_by_a_much_larger_denominator() {
        // Mirrors the closing formula's shape: numerator far below the
        // denominator, quotient well under one.
        let prec = 348u64;
        let yv = BigInt::from(53360u64);
        let xv = BigInt::from(13591409u64);
        let y = FixedPoint::from_bigint(yv.clone(), prec);
        let x = FixedPoint::from_bigint(xv.clone(), prec);
        let quotient = newton::div(&y, &x, prec);
        let reference = (&yv << prec as usize) / &xv;
        assert_close(
            quotient.scaled(prec as i64),
            reference,
            BigInt::from(16u32),
            "53360/13591409 at 348 bits",
        );
    }
}
