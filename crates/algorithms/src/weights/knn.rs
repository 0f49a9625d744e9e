//! K-nearest-neighbour weights from centroids
//!
//! Brute-force planar Euclidean search. Ties in distance keep the input
//! enumeration order, so the nearer-listed entity wins. The resulting
//! adjacency is directed: `a` listing `b` does not imply `b` lists `a`.

use crate::maybe_rayon::*;
use geo_types::Point;
use spatlag_core::{Error, Result};

use super::WeightsMatrix;

/// Weights matrix built by [`knn_weights`] plus distance facts gathered
/// on the way.
#[derive(Debug, Clone)]
pub struct KnnWeights {
    /// Matrix in `Original` transform, all weights 1.0
    pub matrix: WeightsMatrix,
    /// Neighbour count requested
    pub k: usize,
    /// Largest nearest-neighbour distance: the smallest distance band
    /// under which no entity is an island
    pub min_threshold_distance: f64,
}

/// Build KNN weights.
///
/// # Arguments
/// * `points` - `(id, centroid)` pairs in input order
/// * `k` - Neighbours per entity (>= 1); capped at `points.len() - 1`
///
/// # Errors
/// `Configuration` if `k == 0`, `DuplicateId` if two points share an id.
pub fn knn_weights(points: &[(String, Point<f64>)], k: usize) -> Result<KnnWeights> {
    if k == 0 {
        return Err(Error::config("k", k, "neighbour count must be at least 1"));
    }

    let n = points.len();
    let rows: Vec<(Vec<String>, f64)> = (0..n)
        .into_par_iter()
        .map(|i| nearest_of(points, i, k))
        .collect();

    let min_threshold_distance = rows
        .iter()
        .map(|(_, nearest)| *nearest)
        .filter(|d| d.is_finite())
        .fold(0.0_f64, f64::max);

    let matrix = WeightsMatrix::from_rows(points.iter().zip(rows).map(|((id, _), (nbrs, _))| {
        let w = vec![1.0; nbrs.len()];
        (id.clone(), nbrs, w)
    }))?;

    tracing::debug!(
        entities = n,
        k,
        min_threshold_distance,
        "knn weights built"
    );

    Ok(KnnWeights {
        matrix,
        k,
        min_threshold_distance,
    })
}

/// Neighbour ids of point `i`, and its nearest distance (infinite when
/// there is no other point).
fn nearest_of(points: &[(String, Point<f64>)], i: usize, k: usize) -> (Vec<String>, f64) {
    let origin = points[i].1;
    let mut dists: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(j, (_, p))| (j, euclidean(origin, *p)))
        .collect();

    // Stable: equal distances stay in enumeration order
    dists.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let nearest = dists.first().map_or(f64::INFINITY, |&(_, d)| d);
    let nbrs = dists
        .iter()
        .take(k)
        .map(|&(j, _)| points[j].0.clone())
        .collect();
    (nbrs, nearest)
}

#[inline]
fn euclidean(a: Point<f64>, b: Point<f64>) -> f64 {
    let dx = a.x() - b.x();
    let dy = a.y() - b.y();
    (dx * dx + dy * dy).sqrt()
}
