//! Global exploratory spatial data analysis statistics
//!
//! - **moran**: Global Moran's I
//! - **geary**: Geary's C
//! - **getis_ord**: General Getis-Ord G
//! - **join_counts**: Binary join counts
//! - **permutation**: seeded permutation engine shared by all four
//! - **inference**: normal-approximation helpers
//!
//! Every statistic takes attribute values in weights-matrix id order.

pub mod inference;
pub mod permutation;

mod geary;
mod getis_ord;
mod join_counts;
mod moran;

pub use geary::{gearys_c, GearyInterpretation, GearyParams, GearyResult};
pub use getis_ord::{getis_ord_g, GetisOrdParams, GetisOrdResult, HotSpot};
pub use inference::NormalTest;
pub use join_counts::{join_counts, JoinCountsParams, JoinCountsResult, JoinEdges, JoinPattern};
pub use moran::{morans_i, MoranParams, MoranResult};
pub use permutation::{pseudo_p_value, simulate, Lcg, PermutationSummary};

use crate::weights::WeightsMatrix;
use spatlag_core::{Error, Result};

/// Default number of permutations
pub const DEFAULT_PERMUTATIONS: usize = 999;
/// Default permutation seed
pub const DEFAULT_SEED: u64 = 1234;
/// Default significance cut-off for interpretation labels
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Values must align with the matrix and be finite.
///
/// Fewer than two entities is not an error here: every statistic treats it
/// as a degenerate denominator.
fn check_inputs(name: &str, values: &[f64], w: &WeightsMatrix) -> Result<()> {
    if values.len() != w.n() {
        return Err(Error::LengthMismatch {
            expected: w.n(),
            actual: values.len(),
        });
    }
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::Algorithm(format!(
            "{name}: value for entity '{}' is not finite",
            w.ids()[pos]
        )));
    }
    Ok(())
}

/// Deviations from the mean and their sum of squares.
fn centered(values: &[f64]) -> (Vec<f64>, f64) {
    if values.is_empty() {
        return (Vec::new(), 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let z: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let ss = z.iter().map(|d| d * d).sum();
    (z, ss)
}

/// Sample kurtosis `m4 / m2^2` of centred values.
fn kurtosis(z: &[f64], ss: f64) -> f64 {
    let n = z.len() as f64;
    let m4 = z.iter().map(|d| d.powi(4)).sum::<f64>() / n;
    let m2 = ss / n;
    m4 / (m2 * m2)
}

/// `sum_i a_i * b_i`
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
