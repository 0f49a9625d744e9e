//! End-to-end spatial analysis of a feature collection
//!
//! Centroids → KNN weights → transform → attribute extraction → spatial
//! lag → Moran's I, Geary's C, Getis-Ord G, join counts → augmented
//! collection.

mod config;
mod values;

pub use config::AnalysisConfig;
pub use values::{extract_values, LagSummary};

use geo_types::Point;
use serde::Serialize;
use spatlag_core::{
    Algorithm, AttributeValue, Diagnostic, DiagnosticKind, Diagnostics, Error, Feature,
    FeatureCollection, Result,
};
use std::collections::HashMap;

use crate::statistics::{
    gearys_c, getis_ord_g, join_counts, morans_i, GearyResult, GetisOrdResult, JoinCountsResult,
    MoranResult,
};
use crate::vector::centroid;
use crate::weights::{knn_weights, Transform};

/// Property added to every output feature
pub const SPATIAL_LAG_FIELD: &str = "spatial_lag";

/// Everything computed by one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResults {
    pub k: usize,
    pub transform: Transform,
    /// Largest nearest-neighbour distance among entities
    pub min_threshold_distance: f64,
    /// Features in the input collection
    pub n_features: usize,
    /// Features with a centroid, i.e. entities of the weights matrix
    pub n_entities: usize,
    /// Entity ids in matrix order
    pub ids: Vec<String>,
    /// Extracted attribute values, in matrix order
    pub values: Vec<f64>,
    /// Spatial lag of `values`, in matrix order
    pub spatial_lag: Vec<f64>,
    pub lag_summary: LagSummary,
    pub moran: MoranResult,
    pub geary: GearyResult,
    pub getis_ord: GetisOrdResult,
    pub join_counts: JoinCountsResult,
    /// Non-fatal warnings raised along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResults {
    /// Spatial lag of the entity with this id, if it is in the matrix.
    pub fn lag_of(&self, id: &str) -> Option<f64> {
        self.ids.iter().position(|x| x == id).map(|i| self.spatial_lag[i])
    }
}

/// Augmented collection plus results
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Input features, each with a `spatial_lag` property (0 when excluded)
    pub collection: FeatureCollection,
    pub results: AnalysisResults,
}

/// Run the full analysis.
///
/// The input collection is not modified. Configuration problems are
/// returned as `Error::Configuration`; any failure after that is wrapped
/// in `Error::Analysis` with the original error as its source.
///
/// Resolved feature ids (explicit id or position) must be unique across
/// the whole collection, including features without geometry. Fewer than
/// two entities is not an error: each statistic reports 0 with a warning.
pub fn analyze(collection: &FeatureCollection, config: &AnalysisConfig) -> Result<AnalysisOutput> {
    config.validate()?;
    run(collection, config).map_err(Error::into_analysis)
}

fn run(collection: &FeatureCollection, config: &AnalysisConfig) -> Result<AnalysisOutput> {
    collection.resolved_ids()?;
    let mut diag = Diagnostics::new();

    let points = collect_centroids(collection, &mut diag);
    tracing::debug!(
        features = collection.len(),
        entities = points.len(),
        "centroids extracted"
    );

    let knn = knn_weights(&points, config.k)?;
    let mut w = knn.matrix;
    for i in w.islands() {
        let id = w.ids()[i].as_str();
        diag.warn_feature(DiagnosticKind::Island, id, "entity has no neighbours");
    }
    w.set_transform(config.transformation);

    let by_id: HashMap<String, &Feature> = collection.identified().collect();
    let values = extract_values(w.ids(), &by_id, &config.value_field, &mut diag);

    let spatial_lag = w.lag(&values)?;
    let lag_summary = LagSummary::new(&values, &spatial_lag);

    let moran = morans_i(&values, &w, &config.moran_params(), &mut diag)?;
    let geary = gearys_c(&values, &w, &config.geary_params(), &mut diag)?;
    let getis_ord = getis_ord_g(&values, &mut w, &config.getis_ord_params(), &mut diag)?;
    let join_counts = join_counts(&values, &mut w, &config.join_counts_params(), &mut diag)?;
    tracing::debug!(
        i = moran.i,
        c = geary.c,
        g = getis_ord.g,
        bb = join_counts.bb,
        "statistics computed"
    );

    let lag_by_id: HashMap<&str, f64> = w
        .ids()
        .iter()
        .map(String::as_str)
        .zip(spatial_lag.iter().copied())
        .collect();
    let augmented = collection
        .identified()
        .map(|(id, feature)| {
            let lag = lag_by_id.get(id.as_str()).copied().unwrap_or(0.0);
            let mut out = feature.clone();
            out.set_property(SPATIAL_LAG_FIELD, AttributeValue::Float(lag));
            out
        })
        .collect();

    let results = AnalysisResults {
        k: knn.k,
        transform: w.transform(),
        min_threshold_distance: knn.min_threshold_distance,
        n_features: collection.len(),
        n_entities: w.n(),
        ids: w.ids().to_vec(),
        values,
        spatial_lag,
        lag_summary,
        moran,
        geary,
        getis_ord,
        join_counts,
        diagnostics: diag.into_vec(),
    };

    Ok(AnalysisOutput {
        collection: augmented,
        results,
    })
}

/// `(id, centroid)` for every feature that has one, in input order.
fn collect_centroids(
    collection: &FeatureCollection,
    diag: &mut Diagnostics,
) -> Vec<(String, Point<f64>)> {
    collection
        .identified()
        .filter_map(|(id, feature)| match &feature.geometry {
            None => {
                diag.warn_feature(DiagnosticKind::MissingGeometry, id, "feature has no geometry");
                None
            }
            Some(geom) => match centroid(geom) {
                Some(p) => Some((id, p)),
                None => {
                    diag.warn_feature(
                        DiagnosticKind::UnsupportedGeometry,
                        id,
                        "geometry is empty or not a point/polygon type",
                    );
                    None
                }
            },
        })
        .collect()
}

/// [`analyze`] behind the [`Algorithm`] trait
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialAnalysis;

impl Algorithm for SpatialAnalysis {
    type Input = FeatureCollection;
    type Output = AnalysisOutput;
    type Params = AnalysisConfig;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Spatial Analysis"
    }

    fn description(&self) -> &'static str {
        "KNN spatial lag with global Moran's I, Geary's C, Getis-Ord G and join counts"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        analyze(&input, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::{LineString, Polygon};

    fn config(k: usize, permutations: usize) -> AnalysisConfig {
        AnalysisConfig {
            k,
            permutations,
            ..AnalysisConfig::default()
        }
    }

    fn grid_points(side: usize) -> FeatureCollection {
        (0..side * side)
            .map(|k| {
                let (r, c) = (k / side, k % side);
                let count = if c < side / 2 { 10.0 } else { 50.0 };
                Feature::new(Point::new(c as f64, r as f64))
                    .with_id(format!("{k:03}"))
                    .with_property("count", count)
            })
            .collect()
    }

    #[test]
    fn test_every_feature_gets_lag() {
        let mut fc = grid_points(4);
        fc.push(Feature::empty().with_id("nogeom").with_property("count", 1.0));
        fc.push(
            Feature::new(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]))
                .with_id("line")
                .with_property("count", 1.0),
        );

        let out = analyze(&fc, &config(4, 9)).unwrap();
        assert_eq!(out.collection.len(), 18);
        assert_eq!(out.results.n_entities, 16);
        for f in out.collection.iter() {
            assert!(f.get_property(SPATIAL_LAG_FIELD).is_some());
        }
        let excluded = out.collection.iter().find(|f| f.id.as_deref() == Some("nogeom")).unwrap();
        assert_eq!(excluded.get_property(SPATIAL_LAG_FIELD), Some(&AttributeValue::Float(0.0)));

        let kinds: Vec<_> = out.results.diagnostics.iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&DiagnosticKind::MissingGeometry));
        assert!(kinds.contains(&DiagnosticKind::UnsupportedGeometry));
    }

    #[test]
    fn test_input_not_mutated() {
        let fc = grid_points(3);
        let before = fc.clone();
        let _ = analyze(&fc, &config(2, 0)).unwrap();
        assert_eq!(fc, before);
    }

    #[test]
    fn test_polygons_use_vertex_centroids() {
        let square = |x0: f64| {
            Polygon::new(
                LineString::from(vec![
                    (x0, 0.0),
                    (x0 + 1.0, 0.0),
                    (x0 + 1.0, 1.0),
                    (x0, 1.0),
                    (x0, 0.0),
                ]),
                vec![],
            )
        };
        let fc: FeatureCollection = (0..5)
            .map(|i| Feature::new(square(i as f64 * 2.0)).with_property("count", i as f64))
            .collect();
        let out = analyze(&fc, &config(1, 0)).unwrap();
        assert_eq!(out.results.ids, vec!["0", "1", "2", "3", "4"]);
        assert_relative_eq!(out.results.min_threshold_distance, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_k_is_configuration_error() {
        let err = analyze(&grid_points(3), &config(0, 0)).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_pipeline_failure_is_wrapped() {
        let fc: FeatureCollection = vec![
            Feature::new(Point::new(0.0, 0.0)).with_id("dup"),
            Feature::new(Point::new(1.0, 0.0)).with_id("dup"),
        ]
        .into_iter()
        .collect();
        let err = analyze(&fc, &AnalysisConfig::default()).unwrap_err();
        match err {
            Error::Analysis(inner) => assert!(matches!(*inner, Error::DuplicateId(_))),
            other => panic!("expected wrapped error, got {other:?}"),
        }
    }

    #[test]
    fn test_algorithm_trait() {
        let alg = SpatialAnalysis;
        assert_eq!(alg.name(), "Spatial Analysis");
        let out = alg.execute(grid_points(3), config(2, 0)).unwrap();
        assert_eq!(out.results.k, 2);
        assert_eq!(out.results.transform, Transform::RowStandardized);
    }
}
