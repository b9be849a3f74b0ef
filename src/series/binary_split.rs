// src/series/binary_split.rs
//
// Binary splitting of the Chudnovsky series. A term range [a, b) reduces
// to the triplet (P, Q, G):
//   p(b-1,b) = b^3 * C^3 / 24
//   g(b-1,b) = (2b-1)(6b-1)(6b-5)
//   q(b-1,b) = (-1)^b * (A + B*b) * g(b-1,b)
//   p(a,b) = p(a,m) * p(m,b)
//   q(a,b) = q(a,m) * p(m,b) + q(m,b) * g(a,m)
//   g(a,b) = g(a,m) * g(m,b)
// P and G carry factorized shadows of their odd parts so the merge can
// cancel common factors exactly without a general GCD.

use std::ops::Range;
use std::time::{Duration, Instant};

use log::debug;
use num::{BigInt, One, Zero};

use crate::config::pi_config::TuningConfig;
use crate::core::constants::{A, B, C, C_ODD};
use crate::integer_math::factor_sieve::FactorSieve;
use crate::integer_math::factorization::{FactorScratch, Factorization};

/// Partial series value for a half-open term range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesTriplet {
    pub p: BigInt,
    pub q: BigInt,
    pub g: BigInt,
}

impl SeriesTriplet {
    /// Value of an empty term range.
    pub fn identity() -> Self {
        SeriesTriplet {
            p: BigInt::one(),
            q: BigInt::zero(),
            g: BigInt::one(),
        }
    }

    /// Folds the triplet of the adjacent higher term range into self.
    /// `keep_g` skips the G product where no later merge will read it.
    pub fn merge(&mut self, mut right: SeriesTriplet, keep_g: bool) {
        self.p *= &right.p;
        self.q *= &right.p;
        right.q *= &self.g;
        self.q += &right.q;
        if keep_g {
            self.g *= &right.g;
        }
    }
}

/// Recursion slots needed to split `terms` terms: only right children
/// descend a slot, and each right half is at most half its parent, so
/// ceil(log2(terms)) + 1 suffices.
pub fn depth_for_terms(terms: u64) -> usize {
    let mut depth = 0usize;
    while (1u64 << depth) < terms {
        depth += 1;
    }
    depth + 1
}

#[derive(Debug, Default)]
struct SplitSlot {
    triplet: SeriesTriplet,
    fp: Factorization,
    fg: Factorization,
}

/// One worker's share of the series: a contiguous term range, an arena of
/// recursion slots indexed by depth, and private factorization scratch.
/// Nothing here is shared; workers only meet again at the reduction.
pub struct SplitWorker<'a> {
    a: u64,
    b: u64,
    needs_g: bool,
    base_level: u64,
    tuning: TuningConfig,
    sieve: Option<&'a FactorSieve>,
    slots: Vec<SplitSlot>,
    scratch: FactorScratch,
    gcd_elapsed: Duration,
}

impl<'a> SplitWorker<'a> {
    /// `base_level` is the recursion level of the worker's whole range in
    /// the global tree, i.e. ceil(log2(worker count)). `depth` slots must
    /// cover `depth_for_terms` of the full term count.
    pub fn new(
        range: Range<u64>,
        needs_g: bool,
        base_level: u64,
        depth: usize,
        tuning: TuningConfig,
        sieve: Option<&'a FactorSieve>,
    ) -> Self {
        let slots = (0..depth).map(|_| SplitSlot::default()).collect();
        SplitWorker {
            a: range.start,
            b: range.end,
            needs_g,
            base_level,
            tuning,
            sieve,
            slots,
            scratch: FactorScratch::default(),
            gcd_elapsed: Duration::ZERO,
        }
    }

    /// Evaluates the whole range into slot 0.
    pub fn run(&mut self) {
        assert!(self.b > self.a, "term range must not be empty");
        self.split(self.a, self.b, self.needs_g, self.base_level, 0);
        debug!(
            "worker [{}, {}) done, cancellation took {:.3?}",
            self.a, self.b, self.gcd_elapsed
        );
    }

    pub fn gcd_elapsed(&self) -> Duration {
        self.gcd_elapsed
    }

    pub fn into_triplet(mut self) -> SeriesTriplet {
        self.slots.swap_remove(0).triplet
    }

    fn split(&mut self, a: u64, b: u64, needs_g: bool, level: u64, top: usize) {
        if b - a == 1 {
            self.leaf(b, top);
            return;
        }

        let mid = a + ((b - a) as f64 * self.tuning.split_ratio) as u64;
        self.split(a, mid, true, level + 1, top);
        self.split(mid, b, needs_g, level + 1, top + 1);

        // Shallow levels have accumulated too few shared factors for the
        // exact divisions to pay off.
        if self.sieve.is_some() && level >= self.tuning.gcd_min_level {
            let started = Instant::now();
            let (left, right) = self.slots.split_at_mut(top + 1);
            let l = &mut left[top];
            let r = &mut right[0];
            Factorization::remove_common_factors(
                &mut r.triplet.p,
                &mut r.fp,
                &mut l.triplet.g,
                &mut l.fg,
                &mut self.scratch,
            );
            self.gcd_elapsed += started.elapsed();
        }

        let (left, right) = self.slots.split_at_mut(top + 1);
        let l = &mut left[top];
        let r = &mut right[0];

        l.triplet.p *= &r.triplet.p;
        l.triplet.q *= &r.triplet.p;
        r.triplet.q *= &l.triplet.g;
        l.triplet.q += &r.triplet.q;
        if self.sieve.is_some() {
            l.fp.multiply(&r.fp, &mut self.scratch.merge);
        }
        if needs_g {
            l.triplet.g *= &r.triplet.g;
            if self.sieve.is_some() {
                l.fg.multiply(&r.fg, &mut self.scratch.merge);
            }
        }
    }

    fn leaf(&mut self, b: u64, top: usize) {
        let mut p = BigInt::from(b);
        p *= b;
        p *= b;
        p *= (C / 24) * (C / 24);
        p *= C * 24;

        let mut g = BigInt::from(2 * b - 1);
        g *= 6 * b - 1;
        g *= 6 * b - 5;

        let mut q = BigInt::from(b);
        q *= B;
        q += A;
        q *= &g;
        if b % 2 == 1 {
            q = -q;
        }

        if let Some(sieve) = self.sieve {
            let slot = &mut self.slots[top];
            let odd = b >> b.trailing_zeros();
            slot.fp.set_prime_power(sieve, odd, 3);
            slot.fp.multiply_prime_power(sieve, C_ODD, 3, &mut self.scratch);
            // The leading entry is always base 3 (3 divides C_ODD);
            // dropping one 3 leaves the odd part of b^3 * C^3 / 24.
            slot.fp.entries[0].exponent -= 1;

            slot.fg.set_prime_power(sieve, 2 * b - 1, 1);
            slot.fg.multiply_prime_power(sieve, 6 * b - 1, 1, &mut self.scratch);
            slot.fg.multiply_prime_power(sieve, 6 * b - 5, 1, &mut self.scratch);
        }

        let slot = &mut self.slots[top];
        slot.triplet.p = p;
        slot.triplet.q = q;
        slot.triplet.g = g;
    }
}
