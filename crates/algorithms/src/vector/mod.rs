//! Vector geometry helpers
//!
//! - Centroid: representative point per feature for the weights builder

mod centroid;

pub use centroid::centroid;
