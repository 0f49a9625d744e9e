//! Spatial weights
//!
//! - **knn**: k-nearest-neighbour adjacency from centroids
//! - **matrix**: sparse weights, transforms, cached moments
//! - **lag**: spatial lag operator

mod knn;
mod lag;
mod matrix;

pub use knn::{knn_weights, KnnWeights};
pub use lag::spatial_lag;
pub use matrix::{Transform, Triple, WeightsMatrix};
