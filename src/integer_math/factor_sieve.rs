// src/integer_math/factor_sieve.rs
//
// Odd-only smallest-factor sieve. The odd integer n lives at index n >> 1
// and records its smallest prime, that prime's multiplicity, and the index
// of the remaining cofactor, so a full factorization is a short chain walk
// instead of repeated trial division.

use log::debug;

use crate::core::constants::C_ODD;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SieveEntry {
    /// Smallest prime factor of the odd integer this entry represents.
    pub factor: u64,
    /// Multiplicity of that prime.
    pub multiplicity: u64,
    /// Index (n >> 1 form) of the cofactor left after dividing the prime out.
    pub cofactor: usize,
}

/// Smallest-factor table for all odd integers in [1, bound], built once per
/// run and shared read-only across workers.
#[derive(Debug, Clone)]
pub struct FactorSieve {
    pub bound: u64,
    entries: Vec<SieveEntry>,
}

impl FactorSieve {
    /// Sieve bound required to factor every base a series of `terms` terms
    /// produces: the largest linear factor is 6*terms - 1, and the fixed
    /// odd part of C is factorized at every leaf.
    pub fn bound_for_terms(terms: u64) -> u64 {
        (C_ODD + 1).max(terms * 6)
    }

    /// Builds the table for all odd integers in [1, bound].
    pub fn build(bound: u64) -> Self {
        let size = ((bound + 1) / 2) as usize;
        let mut entries = vec![SieveEntry::default(); size];

        // n = 1 is the empty factorization; chain walks stop at index 0.
        entries[0] = SieveEntry {
            factor: 1,
            multiplicity: 1,
            cofactor: 0,
        };

        let mut i = 3u64;
        while i <= bound {
            let id2 = (i >> 1) as usize;
            if entries[id2].factor == 0 {
                entries[id2].factor = i;
                entries[id2].multiplicity = 1;
                // Overflow-free form of i * i <= bound.
                if i <= bound / i {
                    // k tracks the index of j / i, which was sieved earlier.
                    let mut j = i * i;
                    let mut k = id2;
                    while j <= bound {
                        let jd2 = (j >> 1) as usize;
                        if entries[jd2].factor == 0 {
                            entries[jd2].factor = i;
                            if entries[k].factor == i {
                                entries[jd2].multiplicity = entries[k].multiplicity + 1;
                                entries[jd2].cofactor = entries[k].cofactor;
                            } else {
                                entries[jd2].multiplicity = 1;
                                entries[jd2].cofactor = k;
                            }
                        }
                        j += i + i;
                        k += 1;
                    }
                }
            }
            i += 2;
        }

        debug!("factor sieve built: bound {}, {} entries", bound, size);
        FactorSieve { bound, entries }
    }

    /// Entry for the odd integer n.
    #[inline]
    pub fn entry(&self, n: u64) -> &SieveEntry {
        &self.entries[(n >> 1) as usize]
    }

    /// Entry addressed by index (n >> 1 form), used while chain-walking.
    #[inline]
    pub fn entry_at(&self, index: usize) -> &SieveEntry {
        &self.entries[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primes_are_their_own_factor() {
        let sieve = FactorSieve::build(1000);
        for p in [3u64, 5, 7, 11, 13, 97, 541, 997] {
            let entry = sieve.entry(p);
            assert_eq!(entry.factor, p, "{} should be marked prime", p);
            assert_eq!(entry.multiplicity, 1);
            assert_eq!(entry.cofactor, 0, "prime cofactor chain must end at 1");
        }
    }

    #[test]
    fn test_prime_power_multiplicity() {
        let sieve = FactorSieve::build(1000);
        let entry = sieve.entry(27);
        assert_eq!(entry.factor, 3);
        assert_eq!(entry.multiplicity, 3);
        assert_eq!(entry.cofactor, 0);

        // 45 = 3^2 * 5: multiplicity accumulates and the chain points at 5.
        let entry = sieve.entry(45);
        assert_eq!(entry.factor, 3);
        assert_eq!(entry.multiplicity, 2);
        assert_eq!(sieve.entry_at(entry.cofactor).factor, 5);
    }

    #[test]
    fn test_marking_threshold_at_square_bound() {
        // 169 = 13^2 sits exactly on the marking threshold for 13.
        let sieve = FactorSieve::build(169);
        let entry = sieve.entry(169);
        assert_eq!(entry.factor, 13);
        assert_eq!(entry.multiplicity, 2);
        assert_eq!(entry.cofactor, 0);
    }

    #[test]
    fn test_identity_entry() {
        let sieve = FactorSieve::build(100);
        let entry = sieve.entry(1);
        assert_eq!(entry.factor, 1);
        assert_eq!(entry.cofactor, 0);
    }

    #[test]
    fn test_chain_walk_reconstructs_value() {
        let sieve = FactorSieve::build(10_000);
        for n in (1u64..10_000).step_by(2) {
            let mut value = 1u64;
            let mut index = (n >> 1) as usize;
            while index > 0 {
                let entry = sieve.entry_at(index);
                for _ in 0..entry.multiplicity {
                    value *= entry.factor;
                }
                index = entry.cofactor;
            }
            assert_eq!(value, n, "chain walk for {} reconstructed {}", n, value);
        }
    }

    #[test]
    fn test_bound_for_terms() {
        assert_eq!(FactorSieve::bound_for_terms(0), C_ODD + 1);
        assert_eq!(FactorSieve::bound_for_terms(100), C_ODD + 1);
        assert_eq!(FactorSieve::bound_for_terms(10_000), 60_000);
    }
}
