// src/integer_math/factorization.rs
//
// Sparse factorization arithmetic: an integer carried as a sorted list of
// (prime, exponent) entries. Every value that flows through here was first
// factored via the sieve, which is what makes the cancellation in
// remove_common_factors a sound substitute for a general GCD.

use std::cmp::Ordering;
use std::mem;

use num::{BigInt, One};

use crate::integer_math::factor_sieve::FactorSieve;

/// Entries whose ranges fit this many factors are multiplied out directly;
/// larger ranges split into a balanced product tree.
const PRODUCT_TREE_LEAF: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorEntry {
    pub base: u64,
    pub exponent: u64,
}

/// Positive integer represented as the product of its entries, bases
/// strictly increasing. The empty factorization is 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Factorization {
    pub entries: Vec<FactorEntry>,
}

/// Per-worker reusable buffers: one for prime-power expansion, one as the
/// merge destination that gets swapped into place after each multiply.
#[derive(Debug, Default)]
pub struct FactorScratch {
    pub prime_power: Factorization,
    pub merge: Factorization,
}

impl Factorization {
    pub fn new() -> Self {
        Factorization { entries: Vec::new() }
    }

    /// Replaces self with the factorization of n^power by walking n's
    /// cofactor chain through the sieve. n must be odd and within bound.
    pub fn set_prime_power(&mut self, sieve: &FactorSieve, n: u64, power: u64) {
        assert!(n & 1 == 1, "factorized bases must be odd, got {}", n);
        assert!(
            n <= sieve.bound,
            "base {} exceeds the sieve bound {}",
            n,
            sieve.bound
        );
        self.entries.clear();
        let mut index = (n >> 1) as usize;
        while index > 0 {
            let entry = sieve.entry_at(index);
            self.entries.push(FactorEntry {
                base: entry.factor,
                exponent: entry.multiplicity * power,
            });
            index = entry.cofactor;
        }
    }

    pub fn from_prime_power(sieve: &FactorSieve, n: u64, power: u64) -> Self {
        let mut f = Factorization::new();
        f.set_prime_power(sieve, n, power);
        f
    }

    /// self *= other. Linear merge of the two sorted entry lists into the
    /// scratch buffer, which is then swapped into place.
    pub fn multiply(&mut self, other: &Factorization, scratch: &mut Factorization) {
        scratch.entries.clear();
        scratch
            .entries
            .reserve(self.entries.len() + other.entries.len());
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, b) = (self.entries[i], other.entries[j]);
            match a.base.cmp(&b.base) {
                Ordering::Equal => {
                    scratch.entries.push(FactorEntry {
                        base: a.base,
                        exponent: a.exponent + b.exponent,
                    });
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    scratch.entries.push(a);
                    i += 1;
                }
                Ordering::Greater => {
                    scratch.entries.push(b);
                    j += 1;
                }
            }
        }
        scratch.entries.extend_from_slice(&self.entries[i..]);
        scratch.entries.extend_from_slice(&other.entries[j..]);
        mem::swap(&mut self.entries, &mut scratch.entries);
    }

    /// self *= base^power, factoring the base through the sieve.
    pub fn multiply_prime_power(
        &mut self,
        sieve: &FactorSieve,
        base: u64,
        power: u64,
        scratch: &mut FactorScratch,
    ) {
        scratch.prime_power.set_prime_power(sieve, base, power);
        self.multiply(&scratch.prime_power, &mut scratch.merge);
    }

    /// Drops zero-exponent entries in place, preserving order.
    pub fn compact(&mut self) {
        self.entries.retain(|e| e.exponent > 0);
    }

    /// Expands back to a plain integer via a balanced product tree, keeping
    /// multiplication operands near-equal-sized.
    pub fn to_integer(&self) -> BigInt {
        Self::product_tree(&self.entries)
    }

    fn product_tree(entries: &[FactorEntry]) -> BigInt {
        if entries.len() <= PRODUCT_TREE_LEAF {
            let mut r = BigInt::one();
            for e in entries {
                for _ in 0..e.exponent {
                    r *= e.base;
                }
            }
            r
        } else {
            let mid = entries.len() / 2;
            Self::product_tree(&entries[..mid]) * Self::product_tree(&entries[mid..])
        }
    }

    /// Removes the tracked common factor of (p, fp) and (g, fg): for every
    /// shared base the minimum exponent is subtracted from both sides, the
    /// common part is expanded once, and both plain integers are divided by
    /// it exactly. Sound only because every factor in fp and fg came
    /// through the sieve, so no untracked common factor can exist.
    pub fn remove_common_factors(
        p: &mut BigInt,
        fp: &mut Factorization,
        g: &mut BigInt,
        fg: &mut Factorization,
        scratch: &mut FactorScratch,
    ) {
        let common = &mut scratch.merge;
        common.entries.clear();
        let (mut i, mut j) = (0, 0);
        while i < fp.entries.len() && j < fg.entries.len() {
            match fp.entries[i].base.cmp(&fg.entries[j].base) {
                Ordering::Equal => {
                    let c = fp.entries[i].exponent.min(fg.entries[j].exponent);
                    fp.entries[i].exponent -= c;
                    fg.entries[j].exponent -= c;
                    common.entries.push(FactorEntry {
                        base: fp.entries[i].base,
                        exponent: c,
                    });
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        if !common.entries.is_empty() {
            let divisor = common.to_integer();
            *p /= &divisor;
            *g /= &divisor;
            fp.compact();
            fg.compact();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_factorization_is_one() {
        assert_eq!(Factorization::new().to_integer(), BigInt::from(1));
    }

    #[test]
    fn test_prime_power_expansion() {
        let sieve = FactorSieve::build(1000);
        let f = Factorization::from_prime_power(&sieve, 45, 2);
        // 45^2 = 3^4 * 5^2
        assert_eq!(
            f.entries,
            vec![
                FactorEntry { base: 3, exponent: 4 },
                FactorEntry { base: 5, exponent: 2 },
            ]
        );
        assert_eq!(f.to_integer(), BigInt::from(45u64 * 45));
    }

    #[test]
    fn test_multiply_merges_sorted() {
        let sieve = FactorSieve::build(1000);
        let mut f = Factorization::from_prime_power(&sieve, 15, 1); // 3 * 5
        let g = Factorization::from_prime_power(&sieve, 35, 1); // 5 * 7
        let mut scratch = Factorization::new();
        f.multiply(&g, &mut scratch);
        assert_eq!(
            f.entries,
            vec![
                FactorEntry { base: 3, exponent: 1 },
                FactorEntry { base: 5, exponent: 2 },
                FactorEntry { base: 7, exponent: 1 },
            ]
        );
        assert_eq!(f.to_integer(), BigInt::from(15u64 * 35));
    }

    #[test]
    fn test_compact_drops_zero_exponents() {
        let mut f = Factorization {
            entries: vec![
                FactorEntry { base: 3, exponent: 0 },
                FactorEntry { base: 5, exponent: 2 },
                FactorEntry { base: 7, exponent: 0 },
            ],
        };
        f.compact();
        assert_eq!(f.entries, vec![FactorEntry { base: 5, exponent: 2 }]);
    }

    #[test]
    fn test_remove_common_factors() {
        let sieve = FactorSieve::build(1000);
        let mut fp = Factorization::from_prime_power(&sieve, 105, 1); // 3 * 5 * 7
        let mut fg = Factorization::from_prime_power(&sieve, 165, 1); // 3 * 5 * 11
        let mut p = BigInt::from(105);
        let mut g = BigInt::from(165);
        let mut scratch = FactorScratch::default();

        Factorization::remove_common_factors(&mut p, &mut fp, &mut g, &mut fg, &mut scratch);

        // Common part 15 divided out of both sides.
        assert_eq!(p, BigInt::from(7));
        assert_eq!(g, BigInt::from(11));
        assert_eq!(fp.entries, vec![FactorEntry { base: 7, exponent: 1 }]);
        assert_eq!(fg.entries, vec![FactorEntry { base: 11, exponent: 1 }]);
    }

    #[test]
    fn test_product_tree_beyond_leaf_size() {
        let sieve = FactorSieve::build(1000);
        let mut f = Factorization::new();
        let mut scratch = FactorScratch::default();
        let mut expected = BigInt::one();
        // Enough distinct primes to force the recursive split.
        for n in (3u64..200).step_by(2) {
            if sieve.entry(n).factor == n {
                f.multiply_prime_power(&sieve, n, 1, &mut scratch);
                expected *= n;
            }
        }
        assert!(f.entries.len() > PRODUCT_TREE_LEAF);
        assert_eq!(f.to_integer(), expected);
    }
}
