//! General Getis-Ord G
//!
//! G = sum_ij w_ij y_i y_j / sum_{i != j} y_i y_j, with binary weights.
//! Only a permutation test is provided; no analytic variance.

use serde::Serialize;
use spatlag_core::{DiagnosticKind, Diagnostics, Result};

use super::permutation::{simulate, PermutationSummary};
use super::{check_inputs, dot, DEFAULT_PERMUTATIONS, DEFAULT_SEED, DEFAULT_SIGNIFICANCE};
use crate::weights::{Transform, WeightsMatrix};

/// Parameters for Getis-Ord G
#[derive(Debug, Clone, Copy)]
pub struct GetisOrdParams {
    pub permutations: usize,
    pub seed: u64,
    /// Cut-off on `p_sim` for the hot/cold spot label
    pub significance: f64,
}

impl Default for GetisOrdParams {
    fn default() -> Self {
        Self {
            permutations: DEFAULT_PERMUTATIONS,
            seed: DEFAULT_SEED,
            significance: DEFAULT_SIGNIFICANCE,
        }
    }
}

/// Concentration reading of a G result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HotSpot {
    /// High values cluster (z_sim > 0, significant)
    HotSpot,
    /// Low values cluster (z_sim < 0, significant)
    ColdSpot,
    Random,
}

/// Result of General G
#[derive(Debug, Clone, Serialize)]
pub struct GetisOrdResult {
    pub n: usize,
    pub g: f64,
    /// E[G] = S0 / (n (n - 1)) under binary weights
    pub expected: f64,
    pub permutation: Option<PermutationSummary>,
    pub interpretation: HotSpot,
}

impl GetisOrdResult {
    pub fn p_sim(&self) -> Option<f64> {
        self.permutation.as_ref().map(|p| p.p_sim)
    }

    pub fn z_sim(&self) -> Option<f64> {
        self.permutation.as_ref().map(|p| p.z_sim)
    }
}

/// Compute General G.
///
/// The matrix is switched to `Binary` for the computation and restored to
/// its previous transform afterwards.
pub fn getis_ord_g(
    values: &[f64],
    w: &mut WeightsMatrix,
    params: &GetisOrdParams,
    diag: &mut Diagnostics,
) -> Result<GetisOrdResult> {
    check_inputs("Getis-Ord G", values, w)?;
    w.with_transform(Transform::Binary, |wb| general_g(values, wb, params, diag))
}

fn general_g(
    values: &[f64],
    w: &WeightsMatrix,
    params: &GetisOrdParams,
    diag: &mut Diagnostics,
) -> Result<GetisOrdResult> {
    let n = values.len();
    let nf = n as f64;
    let s0 = w.s0();
    let expected = if n > 1 { s0 / (nf * (nf - 1.0)) } else { 0.0 };

    let sum: f64 = values.iter().sum();
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    let den = sum * sum - sum_sq;

    if n < 2 || den == 0.0 || s0 == 0.0 {
        let what = if n < 2 {
            "fewer than 2 entities"
        } else if den == 0.0 {
            "cross-product total is zero"
        } else {
            "weights sum to zero"
        };
        diag.warn(
            DiagnosticKind::DegenerateDenominator,
            format!("Getis-Ord G: {what}, statistic set to 0"),
        );
        return Ok(GetisOrdResult {
            n,
            g: 0.0,
            expected,
            permutation: None,
            interpretation: HotSpot::Random,
        });
    }

    let stat = |ys: &[f64]| dot(ys, &w.lag_unchecked(ys)) / den;
    let g = stat(values);

    let permutation = if params.permutations > 0 {
        let sim = simulate(values, params.permutations, params.seed, stat);
        PermutationSummary::from_sim(g, sim)
    } else {
        None
    };

    let interpretation = match &permutation {
        Some(p) if p.is_significant(params.significance) && p.z_sim > 0.0 => HotSpot::HotSpot,
        Some(p) if p.is_significant(params.significance) && p.z_sim < 0.0 => HotSpot::ColdSpot,
        _ => HotSpot::Random,
    };

    Ok(GetisOrdResult {
        n,
        g,
        expected,
        permutation,
        interpretation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn path(n: usize) -> WeightsMatrix {
        let id = |i: usize| format!("{i:03}");
        let lists = (0..n).map(|i| {
            let mut nbrs = Vec::new();
            if i > 0 {
                nbrs.push(id(i - 1));
            }
            if i + 1 < n {
                nbrs.push(id(i + 1));
            }
            (id(i), nbrs)
        });
        WeightsMatrix::from_neighbor_lists(lists).unwrap()
    }

    #[test]
    fn test_hand_computed() {
        let mut w = path(3);
        // Binary edges: 0-1, 1-2 both directions
        let params = GetisOrdParams::default();
        let r = getis_ord_g(&[1.0, 2.0, 3.0], &mut w, &params, &mut Diagnostics::new()).unwrap();
        // num = 2 * (1*2 + 2*3) = 16, den = 36 - 14 = 22
        assert_relative_eq!(r.g, 16.0 / 22.0, epsilon = 1e-12);
        assert_relative_eq!(r.expected, 4.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_forces_binary_and_restores() {
        let mut w = path(4);
        w.set_transform(Transform::RowStandardized);
        let values = [1.0, 2.0, 3.0, 4.0];

        let params = GetisOrdParams::default();
        let r = getis_ord_g(&values, &mut w, &params, &mut Diagnostics::new()).unwrap();
        assert_eq!(w.transform(), Transform::RowStandardized);

        let mut wb = path(4);
        wb.set_transform(Transform::Binary);
        let rb = getis_ord_g(&values, &mut wb, &params, &mut Diagnostics::new()).unwrap();
        assert_eq!(r.g, rb.g);
        assert_eq!(r.expected, rb.expected);
    }

    #[test]
    fn test_hot_spot() {
        let mut w = path(40);
        let values: Vec<f64> = (0..40).map(|i| if i < 8 { 100.0 } else { 1.0 }).collect();
        let params = GetisOrdParams::default();
        let r = getis_ord_g(&values, &mut w, &params, &mut Diagnostics::new()).unwrap();
        assert!(r.z_sim().unwrap() > 0.0);
        assert_eq!(r.interpretation, HotSpot::HotSpot);
    }

    #[test]
    fn test_single_entity_degenerate() {
        let mut w = WeightsMatrix::from_neighbor_lists(vec![("a", vec![])]).unwrap();
        let mut diag = Diagnostics::new();
        let r = getis_ord_g(&[4.0], &mut w, &GetisOrdParams::default(), &mut diag).unwrap();
        assert_eq!(r.g, 0.0);
        assert_eq!(r.expected, 0.0);
        assert_eq!(r.interpretation, HotSpot::Random);
        assert_eq!(diag.count(DiagnosticKind::DegenerateDenominator), 1);
    }

    #[test]
    fn test_degenerate_single_nonzero() {
        // (sum y)^2 - sum y^2 = 0 when only one value is nonzero
        let mut w = path(3);
        let mut diag = Diagnostics::new();
        let params = GetisOrdParams::default();
        let r = getis_ord_g(&[0.0, 5.0, 0.0], &mut w, &params, &mut diag).unwrap();
        assert_eq!(r.g, 0.0);
        assert!(r.permutation.is_none());
        assert_eq!(diag.count(DiagnosticKind::DegenerateDenominator), 1);
    }
}
