//! # spatlag Algorithms
//!
//! Global spatial autocorrelation for feature collections.
//!
//! ## Modules
//!
//! - **vector**: representative points (centroids) of features
//! - **weights**: KNN spatial weights, transforms, spatial lag
//! - **statistics**: Moran's I, Geary's C, Getis-Ord G, join counts and
//!   the permutation engine behind their pseudo p-values
//! - **analysis**: one-call pipeline from features to augmented features
//!   plus results

mod maybe_rayon;

pub mod analysis;
pub mod statistics;
pub mod vector;
pub mod weights;

pub use analysis::{analyze, AnalysisConfig, AnalysisOutput, AnalysisResults, SpatialAnalysis};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        analyze, AnalysisConfig, AnalysisOutput, AnalysisResults, LagSummary, SpatialAnalysis,
        SPATIAL_LAG_FIELD,
    };
    pub use crate::statistics::{
        gearys_c, getis_ord_g, join_counts, morans_i, GearyInterpretation, GearyParams,
        GearyResult, GetisOrdParams, GetisOrdResult, HotSpot, JoinCountsParams, JoinCountsResult,
        JoinEdges, JoinPattern, MoranParams, MoranResult, PermutationSummary,
    };
    pub use crate::vector::centroid;
    pub use crate::weights::{knn_weights, spatial_lag, KnnWeights, Transform, WeightsMatrix};
    pub use spatlag_core::prelude::*;
}
