// src/core/pi.rs
//
// Orchestrates one full computation: derives the term count and working
// precision from the requested digits, runs the factor sieve and the
// parallel binary splitting, then closes with
//   pi = p * (C/D) * sqrt(C) / (q + A*p)
// using the precision-doubling Newton routines for the division and the
// square root.

use std::time::Instant;

use log::{debug, info};

use crate::config::pi_config::TuningConfig;
use crate::core::constants::{A, BITS_PER_DIGIT, C, D, DIGITS_PER_ITER};
use crate::fixed_point::fixed_point::FixedPoint;
use crate::fixed_point::newton;
use crate::integer_math::factor_sieve::FactorSieve;
use crate::series::binary_split::depth_for_terms;
use crate::series::reduction;

/// Series terms needed to cover `digits` decimal digits. The constant
/// term of the series sits on top of these, so zero is a valid result
/// for small digit counts.
pub fn terms_for_digits(digits: u64) -> u64 {
    (digits as f64 / DIGITS_PER_ITER) as u64
}

/// One computation of pi to a requested number of decimal digits.
#[derive(Debug, Clone)]
pub struct PiComputation {
    digits: u64,
    workers: usize,
    factorization: bool,
    tuning: TuningConfig,
}

impl PiComputation {
    pub fn new(digits: u64, workers: usize, factorization: bool) -> Self {
        PiComputation {
            digits,
            workers,
            factorization,
            tuning: TuningConfig::default(),
        }
    }

    pub fn with_tuning(
        digits: u64,
        workers: usize,
        factorization: bool,
        tuning: TuningConfig,
    ) -> Self {
        PiComputation {
            digits,
            workers,
            factorization,
            tuning,
        }
    }

    /// Runs the computation and renders digits + 2 significant decimal
    /// digits as "3." followed by the fraction.
    pub fn run(&self) -> String {
        assert!(self.digits > 0, "digit count must be positive");
        let total_started = Instant::now();

        let terms = terms_for_digits(self.digits);
        let workers = if terms > 0 {
            self.workers.clamp(1, terms as usize)
        } else {
            1
        };
        info!(
            "digits={}, terms={}, depth={}, workers={}",
            self.digits,
            terms,
            depth_for_terms(terms),
            workers
        );

        let sieve = if self.factorization && terms > 0 {
            let started = Instant::now();
            let sieve = FactorSieve::build(FactorSieve::bound_for_terms(terms));
            info!("sieve   {:8.3}s", started.elapsed().as_secs_f64());
            Some(sieve)
        } else {
            None
        };

        let started = Instant::now();
        let outcome = reduction::evaluate(terms, workers, self.tuning, sieve.as_ref());
        info!("split   {:8.3}s", started.elapsed().as_secs_f64());
        if sieve.is_some() {
            info!("gcd     {:8.3}s", outcome.gcd_elapsed.as_secs_f64());
        }
        drop(sieve);

        let mut p = outcome.triplet.p;
        let q = outcome.triplet.q;
        let psize = (p.bits() as f64 / BITS_PER_DIGIT).ceil() as u64;
        let qsize = (q.bits() as f64 / BITS_PER_DIGIT).ceil() as u64;
        debug!(
            "P size={} digits ({:.3}), Q size={} digits ({:.3})",
            psize,
            psize as f64 / self.digits as f64,
            qsize,
            qsize as f64 / self.digits as f64
        );

        // pi = p*(C/D)*sqrt(C) / (q + A*p)
        let q = q + &p * A;
        p *= C / D;

        let prec = (self.digits as f64 * BITS_PER_DIGIT) as u64 + 16;
        let pf = FixedPoint::from_bigint(p, prec);
        let qf = FixedPoint::from_bigint(q, prec);

        let started = Instant::now();
        let quotient = newton::div(&pf, &qf, prec);
        info!("div     {:8.3}s", started.elapsed().as_secs_f64());

        let started = Instant::now();
        let root = newton::sqrt_u64(C, prec);
        info!("sqrt    {:8.3}s", started.elapsed().as_secs_f64());

        let started = Instant::now();
        let pi = FixedPoint::mul(&quotient, &root, prec);
        info!("mul     {:8.3}s", started.elapsed().as_secs_f64());

        info!("total   {:8.3}s", total_started.elapsed().as_secs_f64());

        pi.to_decimal(self.digits as usize + 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_for_digits() {
        assert_eq!(terms_for_digits(1), 0);
        assert_eq!(terms_for_digits(14), 0);
        assert_eq!(terms_for_digits(15), 1);
        assert_eq!(terms_for_digits(100), 7);
        assert_eq!(terms_for_digits(1_000_000), 70_513);
    }

    #[test]
    #[should_panic(expected = "digit count must be positive")]
    fn test_zero_digits_is_fatal() {
        let _ = PiComputation::new(0, 1, true).run();
    }

    #[test]
    fn test_tiny_run_uses_constant_term_only() {
        // 5 digits need no series terms at all, only the closing formula.
        let digits = PiComputation::new(5, 1, true).run();
        assert!(digits.starts_with("3.14159"), "got {}", digits);
        assert_eq!(digits.len(), 5 + 3);
    }
}
