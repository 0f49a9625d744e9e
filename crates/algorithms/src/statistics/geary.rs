//! Geary's C
//!
//! C = (n - 1) * sum_ij w_ij (y_i - y_j)^2 / (2 * S0 * sum_i (y_i - mean)^2)
//!
//! C < 1 indicates positive spatial autocorrelation, C > 1 negative.

use serde::Serialize;
use spatlag_core::{DiagnosticKind, Diagnostics, Result};

use super::inference::NormalTest;
use super::permutation::{simulate, PermutationSummary};
use super::{
    centered, check_inputs, kurtosis, DEFAULT_PERMUTATIONS, DEFAULT_SEED, DEFAULT_SIGNIFICANCE,
};
use crate::weights::{Transform, WeightsMatrix};

/// Parameters for Geary's C
#[derive(Debug, Clone, Copy)]
pub struct GearyParams {
    pub permutations: usize,
    pub seed: u64,
    pub two_tailed: bool,
    /// Cut-off on `p_sim` for the interpretation label
    pub significance: f64,
}

impl Default for GearyParams {
    fn default() -> Self {
        Self {
            permutations: DEFAULT_PERMUTATIONS,
            seed: DEFAULT_SEED,
            two_tailed: true,
            significance: DEFAULT_SIGNIFICANCE,
        }
    }
}

/// Reading of a Geary's C result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GearyInterpretation {
    /// C < 1, significant
    Clustered,
    /// C > 1, significant
    Dispersed,
    /// Not significant, or no permutation test was run
    Random,
}

/// Result of Geary's C
#[derive(Debug, Clone, Serialize)]
pub struct GearyResult {
    pub n: usize,
    pub transform: Transform,
    pub c: f64,
    /// E[C], always 1
    pub expected: f64,
    pub normal: NormalTest,
    pub randomization: NormalTest,
    pub permutation: Option<PermutationSummary>,
    pub interpretation: GearyInterpretation,
}

impl GearyResult {
    pub fn p_sim(&self) -> Option<f64> {
        self.permutation.as_ref().map(|p| p.p_sim)
    }
}

/// Compute Geary's C under the matrix's active transform.
pub fn gearys_c(
    values: &[f64],
    w: &WeightsMatrix,
    params: &GearyParams,
    diag: &mut Diagnostics,
) -> Result<GearyResult> {
    check_inputs("Geary's C", values, w)?;

    let n = values.len();
    let nf = n as f64;
    let expected = 1.0;
    let (z, z2ss) = centered(values);
    let s0 = w.s0();
    let den = 2.0 * s0 * z2ss;

    if n < 2 || den == 0.0 {
        let what = if n < 2 {
            "fewer than 2 entities"
        } else if z2ss == 0.0 {
            "values have zero variance"
        } else {
            "weights sum to zero"
        };
        diag.warn(
            DiagnosticKind::DegenerateDenominator,
            format!("Geary's C: {what}, statistic set to 0"),
        );
        return Ok(GearyResult {
            n,
            transform: w.transform(),
            c: 0.0,
            expected,
            normal: NormalTest::null(),
            randomization: NormalTest::null(),
            permutation: None,
            interpretation: GearyInterpretation::Random,
        });
    }

    let triples = w.triples();
    let stat = |ys: &[f64]| {
        let num: f64 = triples
            .iter()
            .map(|t| {
                let d = ys[t.focal] - ys[t.neighbor];
                t.weight * d * d
            })
            .sum();
        (nf - 1.0) * num / den
    };
    let c = stat(values);

    let s1 = w.s1();
    let s2 = w.s2();
    let s02 = s0 * s0;
    let n2 = nf * nf;

    let var_norm = ((2.0 * s1 + s2) * (nf - 1.0) - 4.0 * s02) / (2.0 * (nf + 1.0) * s02);

    let randomization = if n > 3 {
        let k = kurtosis(&z, z2ss);
        let a = (nf - 1.0) * s1 * (n2 - 3.0 * nf + 3.0 - (nf - 1.0) * k);
        let b = 0.25 * ((nf - 1.0) * s2 * (n2 + 3.0 * nf - 6.0 - (n2 - nf + 2.0) * k));
        let cc = s02 * (n2 - 3.0 - (nf - 1.0) * (nf - 1.0) * k);
        let var_rand = (a - b + cc) / (nf * (nf - 2.0) * (nf - 3.0) * s02);
        NormalTest::new(c, expected, var_rand, params.two_tailed)
    } else {
        diag.warn(
            DiagnosticKind::DegenerateDenominator,
            format!("Geary's C: randomization variance needs at least 4 entities, got {n}"),
        );
        NormalTest::undefined()
    };

    let permutation = if params.permutations > 0 {
        let sim = simulate(values, params.permutations, params.seed, stat);
        PermutationSummary::from_sim(c, sim)
    } else {
        None
    };

    let significant = permutation
        .as_ref()
        .is_some_and(|p| p.is_significant(params.significance));
    let interpretation = if significant && c < 1.0 {
        GearyInterpretation::Clustered
    } else if significant && c > 1.0 {
        GearyInterpretation::Dispersed
    } else {
        GearyInterpretation::Random
    };

    Ok(GearyResult {
        n,
        transform: w.transform(),
        c,
        expected,
        normal: NormalTest::new(c, expected, var_norm, params.two_tailed),
        randomization,
        permutation,
        interpretation,
    })
}
