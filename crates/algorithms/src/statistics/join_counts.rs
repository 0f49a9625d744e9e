//! Binary join counts
//!
//! Values are split at a threshold into black (1) and white (0). Edges of
//! the binary weights matrix are classified as BB, WW or BW joins.
//!
//! KNN adjacency is directed. With [`JoinEdges::HalvedDirected`] every
//! directed edge is tallied and the totals halved, which is exact only for
//! symmetric matrices and yields fractional counts otherwise. With
//! [`JoinEdges::Undirected`] each unordered pair is counted once.

use serde::{Deserialize, Serialize};
use spatlag_core::{DiagnosticKind, Diagnostics, Result};
use std::collections::BTreeSet;

use super::permutation::{simulate, PermutationSummary};
use super::{check_inputs, DEFAULT_PERMUTATIONS, DEFAULT_SEED, DEFAULT_SIGNIFICANCE};
use crate::weights::{Transform, WeightsMatrix};

/// How the directed adjacency is turned into joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JoinEdges {
    /// Tally every directed edge, divide by 2
    #[default]
    HalvedDirected,
    /// Deduplicate into unordered pairs, no halving
    Undirected,
}

/// Parameters for join counts
#[derive(Debug, Clone, Copy)]
pub struct JoinCountsParams {
    /// Values above this are black (1); `None` uses (min + max) / 2
    pub threshold: Option<f64>,
    pub permutations: usize,
    pub seed: u64,
    pub edges: JoinEdges,
    /// Cut-off on `p_sim_bb` for the pattern label
    pub significance: f64,
}

impl Default for JoinCountsParams {
    fn default() -> Self {
        Self {
            threshold: None,
            permutations: DEFAULT_PERMUTATIONS,
            seed: DEFAULT_SEED,
            edges: JoinEdges::default(),
            significance: DEFAULT_SIGNIFICANCE,
        }
    }
}

/// Pattern reading of a join count result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPattern {
    /// BB joins significantly unusual
    Clustered,
    Random,
}

/// Result of join counts
#[derive(Debug, Clone, Serialize)]
pub struct JoinCountsResult {
    pub n: usize,
    /// Threshold actually used
    pub threshold: f64,
    pub edges: JoinEdges,
    pub bb: f64,
    pub bw: f64,
    pub ww: f64,
    /// Total joins
    pub j: f64,
    pub permutation_bb: Option<PermutationSummary>,
    pub permutation_bw: Option<PermutationSummary>,
    pub pattern: JoinPattern,
}

impl JoinCountsResult {
    pub fn p_sim_bb(&self) -> Option<f64> {
        self.permutation_bb.as_ref().map(|p| p.p_sim)
    }

    pub fn p_sim_bw(&self) -> Option<f64> {
        self.permutation_bw.as_ref().map(|p| p.p_sim)
    }
}

/// Compute join counts.
///
/// The matrix is switched to `Binary` for the computation and restored to
/// its previous transform afterwards.
pub fn join_counts(
    values: &[f64],
    w: &mut WeightsMatrix,
    params: &JoinCountsParams,
    diag: &mut Diagnostics,
) -> Result<JoinCountsResult> {
    check_inputs("Join counts", values, w)?;

    let threshold = params.threshold.unwrap_or_else(|| midpoint(values));
    let binary: Vec<f64> = values
        .iter()
        .map(|&v| if v > threshold { 1.0 } else { 0.0 })
        .collect();

    w.with_transform(Transform::Binary, |wb| {
        count_joins(&binary, wb, threshold, params, diag)
    })
}

fn count_joins(
    y: &[f64],
    w: &WeightsMatrix,
    threshold: f64,
    params: &JoinCountsParams,
    diag: &mut Diagnostics,
) -> Result<JoinCountsResult> {
    let n = y.len();
    let edges = join_edges(w, params.edges);

    if edges.is_empty() {
        diag.warn(
            DiagnosticKind::DegenerateDenominator,
            "Join counts: weights have no edges, counts set to 0",
        );
        return Ok(JoinCountsResult {
            n,
            threshold,
            edges: params.edges,
            bb: 0.0,
            bw: 0.0,
            ww: 0.0,
            j: 0.0,
            permutation_bb: None,
            permutation_bw: None,
            pattern: JoinPattern::Random,
        });
    }

    let divisor = match params.edges {
        JoinEdges::HalvedDirected => {
            let asymmetric = w.asymmetries().len();
            if asymmetric > 0 {
                diag.warn(
                    DiagnosticKind::AsymmetricJoins,
                    format!(
                        "Join counts: {asymmetric} directed edges have no reverse edge; \
                         halved counts may be fractional"
                    ),
                );
            }
            2.0
        }
        JoinEdges::Undirected => 1.0,
    };

    let tally = |ys: &[f64]| tally_joins(ys, &edges, divisor);
    let (bb, bw, ww) = tally(y);
    let j = edges.len() as f64 / divisor;

    let (permutation_bb, permutation_bw) = if params.permutations > 0 {
        let sims = simulate(y, params.permutations, params.seed, |ys| {
            let (bb, bw, _) = tally(ys);
            (bb, bw)
        });
        let (sim_bb, sim_bw): (Vec<f64>, Vec<f64>) = sims.into_iter().unzip();
        (
            PermutationSummary::from_sim(bb, sim_bb),
            PermutationSummary::from_sim(bw, sim_bw),
        )
    } else {
        (None, None)
    };

    let pattern = match &permutation_bb {
        Some(p) if p.is_significant(params.significance) => JoinPattern::Clustered,
        _ => JoinPattern::Random,
    };

    Ok(JoinCountsResult {
        n,
        threshold,
        edges: params.edges,
        bb,
        bw,
        ww,
        j,
        permutation_bb,
        permutation_bw,
        pattern,
    })
}

/// Edge list for counting, from the nonzero binary weights.
fn join_edges(w: &WeightsMatrix, mode: JoinEdges) -> Vec<(usize, usize)> {
    let directed = w
        .triples()
        .iter()
        .filter(|t| t.weight != 0.0 && t.focal != t.neighbor)
        .map(|t| (t.focal, t.neighbor));

    match mode {
        JoinEdges::HalvedDirected => directed.collect(),
        JoinEdges::Undirected => directed
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

/// `(bb, bw, ww)` over `edges`, each divided by `divisor`.
fn tally_joins(y: &[f64], edges: &[(usize, usize)], divisor: f64) -> (f64, f64, f64) {
    let (mut bb, mut bw, mut ww) = (0usize, 0usize, 0usize);
    for &(a, b) in edges {
        match (y[a] == 1.0, y[b] == 1.0) {
            (true, true) => bb += 1,
            (false, false) => ww += 1,
            _ => bw += 1,
        }
    }
    (bb as f64 / divisor, bw as f64 / divisor, ww as f64 / divisor)
}

/// `(min + max) / 2`, or 0 for no values.
fn midpoint(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    (min + max) / 2.0
}
