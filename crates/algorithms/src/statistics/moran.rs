//! Global Moran's I
//!
//! I = (n / S0) * (z' W z) / (z' z), z = y - mean(y).
//! Analytic inference under normality and under randomization (Cliff &
//! Ord), plus a permutation test.

use serde::Serialize;
use spatlag_core::{DiagnosticKind, Diagnostics, Result};

use super::inference::NormalTest;
use super::permutation::{simulate, PermutationSummary};
use super::{centered, check_inputs, dot, kurtosis, DEFAULT_PERMUTATIONS, DEFAULT_SEED};
use crate::weights::{Transform, WeightsMatrix};

/// Parameters for Moran's I
#[derive(Debug, Clone, Copy)]
pub struct MoranParams {
    /// Permutations for the pseudo p-value; 0 disables the test
    pub permutations: usize,
    pub seed: u64,
    /// Two-tailed analytic p-values (default: true)
    pub two_tailed: bool,
}

impl Default for MoranParams {
    fn default() -> Self {
        Self {
            permutations: DEFAULT_PERMUTATIONS,
            seed: DEFAULT_SEED,
            two_tailed: true,
        }
    }
}

/// Result of global Moran's I
#[derive(Debug, Clone, Serialize)]
pub struct MoranResult {
    pub n: usize,
    /// Transform the statistic was computed under
    pub transform: Transform,
    /// Moran's I
    pub i: f64,
    /// E[I] = -1 / (n - 1)
    pub expected: f64,
    /// Inference under the normality assumption
    pub normal: NormalTest,
    /// Inference under the randomization assumption
    pub randomization: NormalTest,
    /// Permutation test, when permutations > 0
    pub permutation: Option<PermutationSummary>,
}

impl MoranResult {
    pub fn p_sim(&self) -> Option<f64> {
        self.permutation.as_ref().map(|p| p.p_sim)
    }
}

/// Compute global Moran's I under the matrix's active transform.
///
/// # Arguments
/// * `values` - Attribute values in matrix id order
/// * `w` - Spatial weights
/// * `params` - Permutation and tail settings
/// * `diag` - Receives a warning when the statistic is degenerate
///
/// # Returns
/// MoranResult; I = 0 with null inference when there are fewer than 2
/// entities, the values have zero variance or the weights sum to zero.
/// E[I] is reported as 0 below 2 entities.
pub fn morans_i(
    values: &[f64],
    w: &WeightsMatrix,
    params: &MoranParams,
    diag: &mut Diagnostics,
) -> Result<MoranResult> {
    check_inputs("Moran's I", values, w)?;

    let n = values.len();
    let nf = n as f64;
    let expected = if n > 1 { -1.0 / (nf - 1.0) } else { 0.0 };
    let (z, z2ss) = centered(values);
    let s0 = w.s0();

    if n < 2 || z2ss == 0.0 || s0 == 0.0 {
        let what = if n < 2 {
            "fewer than 2 entities"
        } else if z2ss == 0.0 {
            "values have zero variance"
        } else {
            "weights sum to zero"
        };
        diag.warn(
            DiagnosticKind::DegenerateDenominator,
            format!("Moran's I: {what}, statistic set to 0"),
        );
        return Ok(MoranResult {
            n,
            transform: w.transform(),
            i: 0.0,
            expected,
            normal: NormalTest::null(),
            randomization: NormalTest::null(),
            permutation: None,
        });
    }

    let scale = nf / s0;
    let stat = |zs: &[f64]| scale * dot(zs, &w.lag_unchecked(zs)) / z2ss;
    let i = stat(&z);

    let s1 = w.s1();
    let s2 = w.s2();
    let s02 = s0 * s0;
    let n2 = nf * nf;

    let var_norm = (n2 * s1 - nf * s2 + 3.0 * s02) / ((nf - 1.0) * (nf + 1.0) * s02)
        - expected * expected;

    let randomization = if n > 3 {
        let k = kurtosis(&z, z2ss);
        let a = nf * ((n2 - 3.0 * nf + 3.0) * s1 - nf * s2 + 3.0 * s02);
        let b = k * ((n2 - nf) * s1 - 2.0 * nf * s2 + 6.0 * s02);
        let var_rand = (a - b) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0) * s02) - expected * expected;
        NormalTest::new(i, expected, var_rand, params.two_tailed)
    } else {
        diag.warn(
            DiagnosticKind::DegenerateDenominator,
            format!("Moran's I: randomization variance needs at least 4 entities, got {n}"),
        );
        NormalTest::undefined()
    };

    let permutation = if params.permutations > 0 {
        let sim = simulate(&z, params.permutations, params.seed, stat);
        PermutationSummary::from_sim(i, sim)
    } else {
        None
    };

    Ok(MoranResult {
        n,
        transform: w.transform(),
        i,
        expected,
        normal: NormalTest::new(i, expected, var_norm, params.two_tailed),
        randomization,
        permutation,
    })
}
