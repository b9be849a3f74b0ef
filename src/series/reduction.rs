// src/series/reduction.rs
//
// Parallel evaluation of the full term range: contiguous sub-ranges fan
// out to independent workers, then fold pairwise in log2(workers) stages.
// Merges within a stage run in parallel; a stage completes fully before
// the next begins. After the fan-out the only cross-worker value is the
// summed cancellation time.

use std::mem;
use std::time::Duration;

use log::debug;
use rayon::prelude::*;

use crate::config::pi_config::TuningConfig;
use crate::integer_math::factor_sieve::FactorSieve;
use crate::series::binary_split::{depth_for_terms, SeriesTriplet, SplitWorker};

/// Merged result of the whole term range.
#[derive(Debug)]
pub struct ReductionOutcome {
    pub triplet: SeriesTriplet,
    /// Total time the workers spent removing common factors.
    pub gcd_elapsed: Duration,
}

/// Evaluates terms [0, terms) across `workers` contiguous ranges. The
/// worker count is clamped to [1, terms]; each of the first workers - 1
/// ranges holds floor(terms / workers) terms and the last absorbs the
/// remainder.
pub fn evaluate(
    terms: u64,
    workers: usize,
    tuning: TuningConfig,
    sieve: Option<&FactorSieve>,
) -> ReductionOutcome {
    if terms == 0 {
        return ReductionOutcome {
            triplet: SeriesTriplet::identity(),
            gcd_elapsed: Duration::ZERO,
        };
    }

    let count = workers.clamp(1, terms as usize);
    if count != workers {
        debug!("worker count reset from {} to {}", workers, count);
    }

    // Workers enter the recursion at the level their range occupies in
    // the global split tree.
    let mut base_level = 0u64;
    while (1usize << base_level) < count {
        base_level += 1;
    }
    let depth = depth_for_terms(terms);
    let chunk = terms / count as u64;

    let mut pool: Vec<SplitWorker> = (0..count)
        .map(|i| {
            let start = i as u64 * chunk;
            let end = if i + 1 == count { terms } else { start + chunk };
            // The final range's G is never read by any later merge.
            SplitWorker::new(start..end, i + 1 < count, base_level, depth, tuning, sieve)
        })
        .collect();

    pool.par_iter_mut().for_each(|worker| worker.run());

    let mut gcd_elapsed = Duration::ZERO;
    let mut results: Vec<SeriesTriplet> = Vec::with_capacity(count);
    for worker in pool {
        gcd_elapsed += worker.gcd_elapsed();
        results.push(worker.into_triplet());
    }

    // Pairwise fold: the stage with gap k merges (i, i + k) for i on a
    // 2k stride. A merged node keeps G only while it stays clear of the
    // final range.
    let total = results.len();
    let mut gap = 1usize;
    while gap < total {
        results
            .par_chunks_mut(2 * gap)
            .enumerate()
            .for_each(|(index, pair)| {
                if pair.len() > gap {
                    let right = mem::take(&mut pair[gap]);
                    let keep_g = index * 2 * gap + 2 * gap < total;
                    pair[0].merge(right, keep_g);
                }
            });
        gap *= 2;
    }

    ReductionOutcome {
        triplet: results.swap_remove(0),
        gcd_elapsed,
    }
}
