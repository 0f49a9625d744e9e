//! Analysis configuration

use serde::{Deserialize, Serialize};
use spatlag_core::{Error, Result};

use crate::statistics::{
    GearyParams, GetisOrdParams, JoinCountsParams, JoinEdges, MoranParams, DEFAULT_PERMUTATIONS,
    DEFAULT_SEED, DEFAULT_SIGNIFICANCE,
};
use crate::weights::Transform;

/// Options for [`analyze`](super::analyze).
///
/// Deserializes from camelCase keys; every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Neighbours per feature (default 8)
    pub k: usize,
    /// Attribute analysed (default "count")
    pub value_field: String,
    /// Weights transform for the lag, Moran and Geary (default R)
    pub transformation: Transform,
    /// Join count split point; `None` uses the value midpoint
    pub binary_threshold: Option<f64>,
    /// Permutations per statistic; 0 skips permutation tests (default 999)
    pub permutations: usize,
    /// Permutation seed (default 1234)
    pub seed: u64,
    /// Two-tailed analytic p-values for Moran and Geary (default true)
    pub two_tailed: bool,
    /// Cut-off used by the interpretation labels (default 0.05)
    pub significance: f64,
    /// Edge handling for join counts
    pub join_edges: JoinEdges,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            k: 8,
            value_field: "count".to_string(),
            transformation: Transform::RowStandardized,
            binary_threshold: None,
            permutations: DEFAULT_PERMUTATIONS,
            seed: DEFAULT_SEED,
            two_tailed: true,
            significance: DEFAULT_SIGNIFICANCE,
            join_edges: JoinEdges::HalvedDirected,
        }
    }
}

impl AnalysisConfig {
    /// Set the transform from its code ("O", "B" or "R").
    pub fn with_transformation(mut self, code: &str) -> Result<Self> {
        self.transformation = code.parse()?;
        Ok(self)
    }

    /// Reject configurations no analysis can run with.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::config("k", self.k, "neighbour count must be at least 1"));
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(Error::config(
                "significance",
                self.significance,
                "must lie strictly between 0 and 1",
            ));
        }
        if let Some(t) = self.binary_threshold {
            if !t.is_finite() {
                return Err(Error::config("binaryThreshold", t, "must be finite"));
            }
        }
        Ok(())
    }

    pub fn moran_params(&self) -> MoranParams {
        MoranParams {
            permutations: self.permutations,
            seed: self.seed,
            two_tailed: self.two_tailed,
        }
    }

    pub fn geary_params(&self) -> GearyParams {
        GearyParams {
            permutations: self.permutations,
            seed: self.seed,
            two_tailed: self.two_tailed,
            significance: self.significance,
        }
    }

    pub fn getis_ord_params(&self) -> GetisOrdParams {
        GetisOrdParams {
            permutations: self.permutations,
            seed: self.seed,
            significance: self.significance,
        }
    }

    pub fn join_counts_params(&self) -> JoinCountsParams {
        JoinCountsParams {
            threshold: self.binary_threshold,
            permutations: self.permutations,
            seed: self.seed,
            edges: self.join_edges,
            significance: self.significance,
        }
    }
}
