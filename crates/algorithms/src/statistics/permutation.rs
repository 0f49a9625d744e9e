//! Seeded permutation inference
//!
//! Trial `t` shuffles a fresh copy of the input with its own generator,
//! seeded from `(seed, t)`. Trials are therefore independent and can run
//! in parallel, while the simulated distribution for a given seed is the
//! same on every run and every thread count.

use crate::maybe_rayon::*;
use serde::Serialize;

use super::inference::normal_p_value;

/// Linear congruential generator (Knuth MMIX constants).
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform in [0, 1), from the high 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index in `0..bound`. `bound` must be nonzero.
    pub fn below(&mut self, bound: usize) -> usize {
        ((self.next_f64() * bound as f64) as usize).min(bound - 1)
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.below(i + 1);
            slice.swap(i, j);
        }
    }
}

/// Generator seed for trial `trial` of a run seeded with `seed`.
///
/// SplitMix64 finaliser over the `trial + 1`-th Weyl step, so nearby
/// seeds and trials do not give correlated LCG streams.
pub fn trial_seed(seed: u64, trial: usize) -> u64 {
    let step = (trial as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut z = seed.wrapping_add(step);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Evaluate `stat` on `permutations` shuffled copies of `values`.
///
/// Output is in trial order.
pub fn simulate<T, F>(values: &[f64], permutations: usize, seed: u64, stat: F) -> Vec<T>
where
    T: Send,
    F: Fn(&[f64]) -> T + Sync + Send,
{
    (0..permutations)
        .into_par_iter()
        .map(|t| {
            let mut shuffled = values.to_vec();
            Lcg::new(trial_seed(seed, t)).shuffle(&mut shuffled);
            stat(&shuffled)
        })
        .collect()
}

/// Pseudo p-value of `observed` against a simulated distribution.
///
/// Counts simulated values `>= observed`, folds to the smaller tail, and
/// returns `(larger, (larger + 1) / (P + 1))`.
pub fn pseudo_p_value(observed: f64, sim: &[f64]) -> (usize, f64) {
    let permutations = sim.len();
    let mut larger = sim.iter().filter(|&&s| s >= observed).count();
    if permutations - larger < larger {
        larger = permutations - larger;
    }
    let p = (larger + 1) as f64 / (permutations + 1) as f64;
    (larger, p)
}

/// Simulated distribution of a statistic and what it says about the
/// observed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermutationSummary {
    pub permutations: usize,
    pub sim: Vec<f64>,
    pub larger: usize,
    pub p_sim: f64,
    pub mean: f64,
    /// Population variance of `sim`
    pub variance: f64,
    pub std: f64,
    /// `(observed - mean) / std`, 0 when `std` is 0
    pub z_sim: f64,
    /// One-tailed normal p-value of `|z_sim|`
    pub p_z_sim: f64,
}

impl PermutationSummary {
    /// Summarise `sim`. Returns `None` when no trials were run.
    pub fn from_sim(observed: f64, sim: Vec<f64>) -> Option<Self> {
        if sim.is_empty() {
            return None;
        }
        let p = sim.len() as f64;
        let (larger, p_sim) = pseudo_p_value(observed, &sim);
        let mean = sim.iter().sum::<f64>() / p;
        let variance = sim.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / p;
        let std = variance.sqrt();
        let z_sim = if std > 0.0 { (observed - mean) / std } else { 0.0 };
        Some(Self {
            permutations: sim.len(),
            larger,
            p_sim,
            mean,
            variance,
            std,
            z_sim,
            p_z_sim: normal_p_value(z_sim, false),
            sim,
        })
    }

    /// Whether `p_sim` is below `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_sim < alpha
    }
}
