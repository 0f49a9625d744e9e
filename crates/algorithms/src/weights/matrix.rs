//! Sparse spatial weights matrix
//!
//! Rows are stored per entity as parallel neighbour/weight vectors. Each
//! transform, once derived from the original weights, is kept as a
//! write-once snapshot; switching modes only drops the derived scalars
//! (s0, s1, s2) and the flattened edge list, which are rebuilt lazily.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use spatlag_core::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Weight transformation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Transform {
    /// Weights as built (all 1.0 for KNN)
    #[serde(rename = "O")]
    Original,
    /// Every nonzero weight forced to 1.0
    #[serde(rename = "B")]
    Binary,
    /// Each row divided by its sum; island rows stay zero
    #[default]
    #[serde(rename = "R")]
    RowStandardized,
}

impl Transform {
    /// Single-letter code of the mode.
    pub fn code(&self) -> &'static str {
        match self {
            Transform::Original => "O",
            Transform::Binary => "B",
            Transform::RowStandardized => "R",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Transform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "O" => Ok(Transform::Original),
            "B" => Ok(Transform::Binary),
            "R" => Ok(Transform::RowStandardized),
            _ => Err(Error::config(
                "transformation",
                s,
                "unsupported weights transformation, expected one of O, B, R",
            )),
        }
    }
}

impl TryFrom<String> for Transform {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// One directed edge of the matrix, by entity index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triple {
    pub focal: usize,
    pub neighbor: usize,
    pub weight: f64,
}

/// Scalars and edge list that depend on the active transform.
#[derive(Debug, Clone, Default)]
struct Derived {
    s0: OnceLock<f64>,
    s1: OnceLock<f64>,
    s2: OnceLock<f64>,
    triples: OnceLock<Vec<Triple>>,
}

/// Spatial weights over an ordered entity set.
#[derive(Debug, Clone)]
pub struct WeightsMatrix {
    /// Entity identifiers, sorted lexicographically
    ids: Vec<String>,
    index: HashMap<String, usize>,
    /// Neighbour indices per entity
    neighbors: Vec<Vec<usize>>,
    /// Weight rows per computed transform; never modified once inserted
    snapshots: HashMap<Transform, Vec<Vec<f64>>>,
    transform: Transform,
    derived: Derived,
}

impl WeightsMatrix {
    /// Build a matrix from `(id, neighbour ids, weights)` rows.
    ///
    /// Rows may arrive in any order; entities are re-ordered by
    /// identifier. The given weights become the `Original` snapshot and
    /// `Original` is the active transform.
    ///
    /// # Errors
    /// `DuplicateId` if an identifier appears twice, `UnknownId` if a
    /// neighbour is not itself an entity, `LengthMismatch` if a row's
    /// neighbour and weight vectors differ in length.
    pub fn from_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<String>, Vec<f64>)>,
    {
        let mut rows: Vec<(String, Vec<String>, Vec<f64>)> = rows.into_iter().collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let mut index = HashMap::with_capacity(rows.len());
        for (i, (id, _, _)) in rows.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(Error::DuplicateId(id.clone()));
            }
        }

        let mut ids = Vec::with_capacity(rows.len());
        let mut neighbors = Vec::with_capacity(rows.len());
        let mut weights = Vec::with_capacity(rows.len());

        for (id, nbr_ids, w) in rows {
            if nbr_ids.len() != w.len() {
                return Err(Error::LengthMismatch {
                    expected: nbr_ids.len(),
                    actual: w.len(),
                });
            }
            let nbrs = nbr_ids
                .iter()
                .map(|nid| {
                    index
                        .get(nid)
                        .copied()
                        .ok_or_else(|| Error::UnknownId(nid.clone()))
                })
                .collect::<Result<Vec<usize>>>()?;
            ids.push(id);
            neighbors.push(nbrs);
            weights.push(w);
        }

        let mut snapshots = HashMap::new();
        snapshots.insert(Transform::Original, weights);

        Ok(Self {
            ids,
            index,
            neighbors,
            snapshots,
            transform: Transform::Original,
            derived: Derived::default(),
        })
    }

    /// Build a matrix from neighbour lists with uniform weight 1.0.
    pub fn from_neighbor_lists<I, S>(lists: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        Self::from_rows(lists.into_iter().map(|(id, nbrs)| {
            let nbrs: Vec<String> = nbrs.into_iter().map(Into::into).collect();
            let w = vec![1.0; nbrs.len()];
            (id.into(), nbrs, w)
        }))
    }

    /// Number of entities
    pub fn n(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entity identifiers in matrix order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Position of an identifier in matrix order
    pub fn id_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Active transform
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Neighbour indices of entity `i`
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    /// Neighbour identifiers of entity `i`
    pub fn neighbor_ids(&self, i: usize) -> impl Iterator<Item = &str> + '_ {
        self.neighbors[i].iter().map(move |&j| self.ids[j].as_str())
    }

    /// Weights of entity `i` under the active transform
    pub fn weights(&self, i: usize) -> &[f64] {
        &self.weight_rows()[i]
    }

    /// All weight rows under the active transform
    pub fn weight_rows(&self) -> &[Vec<f64>] {
        // The active transform always has a snapshot: `Original` is
        // inserted at construction and `set_transform` inserts before
        // switching.
        &self.snapshots[&self.transform]
    }

    /// Whether a snapshot for `mode` has already been derived.
    pub fn has_snapshot(&self, mode: Transform) -> bool {
        self.snapshots.contains_key(&mode)
    }

    /// Switch the active transform.
    ///
    /// Selecting the active mode again is a no-op and keeps every cached
    /// scalar. Any other mode is restored from its snapshot or derived
    /// from the `Original` weights, and the derived caches are reset.
    pub fn set_transform(&mut self, mode: Transform) {
        if mode == self.transform {
            return;
        }
        if !self.snapshots.contains_key(&mode) {
            let derived = derive_weights(&self.snapshots[&Transform::Original], mode);
            self.snapshots.insert(mode, derived);
        }
        tracing::debug!(from = %self.transform, to = %mode, "weights transform switched");
        self.transform = mode;
        self.derived = Derived::default();
    }

    /// Switch the active transform by its code ("O", "B" or "R").
    pub fn set_transform_code(&mut self, code: &str) -> Result<()> {
        let mode = code.parse::<Transform>()?;
        self.set_transform(mode);
        Ok(())
    }

    /// Run `f` with `mode` active, then restore the previous mode.
    pub fn with_transform<R>(&mut self, mode: Transform, f: impl FnOnce(&Self) -> R) -> R {
        let previous = self.transform;
        self.set_transform(mode);
        let out = f(self);
        self.set_transform(previous);
        out
    }

    /// Sum of all weights
    pub fn s0(&self) -> f64 {
        *self
            .derived
            .s0
            .get_or_init(|| self.weight_rows().iter().flatten().sum())
    }

    /// `0.5 * sum_ij (w_ij + w_ji)^2`
    pub fn s1(&self) -> f64 {
        *self.derived.s1.get_or_init(|| {
            let w = self.full();
            let sym = &w + &w.t();
            0.5 * sym.mapv(|v| v * v).sum()
        })
    }

    /// `sum_i (row_sum_i + col_sum_i)^2`
    pub fn s2(&self) -> f64 {
        *self.derived.s2.get_or_init(|| {
            let n = self.n();
            let mut row = vec![0.0; n];
            let mut col = vec![0.0; n];
            for t in self.triples() {
                row[t.focal] += t.weight;
                col[t.neighbor] += t.weight;
            }
            row.iter().zip(&col).map(|(r, c)| (r + c) * (r + c)).sum()
        })
    }

    /// Flattened `(focal, neighbour, weight)` edges in row order.
    pub fn triples(&self) -> &[Triple] {
        self.derived.triples.get_or_init(|| {
            let rows = self.weight_rows();
            self.neighbors
                .iter()
                .zip(rows)
                .enumerate()
                .flat_map(|(focal, (nbrs, ws))| {
                    nbrs.iter().zip(ws).map(move |(&neighbor, &weight)| Triple {
                        focal,
                        neighbor,
                        weight,
                    })
                })
                .collect()
        })
    }

    /// Dense n×n view of the active weights.
    pub fn full(&self) -> Array2<f64> {
        let n = self.n();
        let mut dense = Array2::<f64>::zeros((n, n));
        for (i, (nbrs, ws)) in self.neighbors.iter().zip(self.weight_rows()).enumerate() {
            for (&j, &w) in nbrs.iter().zip(ws) {
                dense[[i, j]] += w;
            }
        }
        dense
    }

    /// Number of neighbours per entity
    pub fn cardinalities(&self) -> Vec<usize> {
        self.neighbors.iter().map(Vec::len).collect()
    }

    /// Indices of entities without neighbours
    pub fn islands(&self) -> Vec<usize> {
        self.neighbors
            .iter()
            .enumerate()
            .filter(|(_, nbrs)| nbrs.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Average number of neighbours
    pub fn mean_neighbors(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.neighbors.iter().map(Vec::len).sum::<usize>() as f64 / self.n() as f64
    }

    /// Percentage of nonzero cells in the dense matrix
    pub fn pct_nonzero(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let nonzero = self.triples().iter().filter(|t| t.weight != 0.0).count();
        100.0 * nonzero as f64 / (self.n() * self.n()) as f64
    }

    /// Directed edges `(i, j)` with no reverse edge `(j, i)`.
    pub fn asymmetries(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (i, nbrs) in self.neighbors.iter().enumerate() {
            for &j in nbrs {
                if !self.neighbors[j].contains(&i) {
                    out.push((i, j));
                }
            }
        }
        out
    }

    /// Whether every edge has a reverse edge.
    pub fn is_symmetric(&self) -> bool {
        self.asymmetries().is_empty()
    }
}

fn derive_weights(original: &[Vec<f64>], mode: Transform) -> Vec<Vec<f64>> {
    match mode {
        Transform::Original => original.to_vec(),
        Transform::Binary => original
            .iter()
            .map(|row| row.iter().map(|&w| if w != 0.0 { 1.0 } else { 0.0 }).collect())
            .collect(),
        Transform::RowStandardized => original
            .iter()
            .map(|row| {
                let sum: f64 = row.iter().sum();
                if sum == 0.0 {
                    row.clone()
                } else {
                    row.iter().map(|&w| w / sum).collect()
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn abc() -> WeightsMatrix {
        WeightsMatrix::from_neighbor_lists(vec![
            ("A", vec!["B", "C"]),
            ("B", vec!["A"]),
            ("C", vec!["A"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_ids_sorted_lexicographically() {
        let w = WeightsMatrix::from_neighbor_lists(vec![
            ("10", vec!["2"]),
            ("2", vec!["10"]),
            ("1", vec!["2"]),
        ])
        .unwrap();
        assert_eq!(w.ids(), &["1", "10", "2"]);
        assert_eq!(w.neighbor_ids(0).collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(w.transform(), Transform::Original);
    }

    #[test]
    fn test_construction_errors() {
        let dup = WeightsMatrix::from_neighbor_lists(vec![("a", vec![]), ("a", vec![])]);
        assert!(matches!(dup, Err(Error::DuplicateId(id)) if id == "a"));

        let unknown = WeightsMatrix::from_neighbor_lists(vec![("a", vec!["z"])]);
        assert!(matches!(unknown, Err(Error::UnknownId(id)) if id == "z"));

        let ragged = WeightsMatrix::from_rows(vec![("a".to_string(), vec![], vec![1.0])]);
        assert!(matches!(ragged, Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn test_row_standardized_rows_sum_to_one() {
        let mut w = WeightsMatrix::from_neighbor_lists(vec![
            ("a", vec!["b", "c"]),
            ("b", vec!["a", "c", "d"]),
            ("c", vec!["a"]),
            ("d", vec![]),
        ])
        .unwrap();
        w.set_transform(Transform::RowStandardized);

        for i in 0..w.n() {
            let sum: f64 = w.weights(i).iter().sum();
            if w.neighbors(i).is_empty() {
                assert_eq!(sum, 0.0);
            } else {
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            }
        }
        assert_eq!(w.islands(), vec![3]);
    }

    #[test]
    fn test_binary_forces_nonzero_to_one() {
        let mut w = WeightsMatrix::from_rows(vec![
            ("a".to_string(), vec!["b".to_string()], vec![0.25]),
            ("b".to_string(), vec!["a".to_string()], vec![0.0]),
        ])
        .unwrap();
        w.set_transform(Transform::Binary);
        assert_eq!(w.weights(0), &[1.0]);
        assert_eq!(w.weights(1), &[0.0]);
    }

    #[test]
    fn test_transform_codes() {
        assert_eq!("R".parse::<Transform>().unwrap(), Transform::RowStandardized);
        assert_eq!("b".parse::<Transform>().unwrap(), Transform::Binary);
        assert_eq!(Transform::Original.to_string(), "O");
        let err = "V".parse::<Transform>().unwrap_err();
        assert!(matches!(err, Error::Configuration { name: "transformation", .. }));

        let mut w = abc();
        assert!(w.set_transform_code("X").is_err());
        assert_eq!(w.transform(), Transform::Original);
    }

    #[test]
    fn test_same_mode_keeps_caches() {
        let mut w = abc();
        w.set_transform(Transform::RowStandardized);
        let before = w.weight_rows().to_vec();
        let s0 = w.s0();
        let s1 = w.s1();

        w.set_transform(Transform::RowStandardized);
        assert_eq!(w.weight_rows(), before.as_slice());
        assert_eq!(w.derived.s0.get().copied(), Some(s0));
        assert_eq!(w.derived.s1.get().copied(), Some(s1));
    }

    #[test]
    fn test_switch_invalidates_scalars_not_snapshots() {
        let mut w = abc();
        w.set_transform(Transform::RowStandardized);
        let row_std = w.weight_rows().to_vec();
        let _ = w.s0();
        let _ = w.triples();

        w.set_transform(Transform::Binary);
        assert!(w.derived.s0.get().is_none());
        assert!(w.derived.triples.get().is_none());
        assert!(w.has_snapshot(Transform::RowStandardized));

        w.set_transform(Transform::RowStandardized);
        assert_eq!(w.weight_rows(), row_std.as_slice());
    }

    #[test]
    fn test_moments_binary() {
        let mut w = abc();
        w.set_transform(Transform::Binary);
        // Symmetric edges A-B and A-C
        assert_relative_eq!(w.s0(), 4.0);
        // Each unordered pair contributes (1+1)^2 twice, halved: 2 pairs * 4
        assert_relative_eq!(w.s1(), 8.0);
        // A: (2+2)^2, B: (1+1)^2, C: (1+1)^2
        assert_relative_eq!(w.s2(), 24.0);
    }

    #[test]
    fn test_moments_row_standardized() {
        let mut w = abc();
        w.set_transform(Transform::RowStandardized);
        assert_relative_eq!(w.s0(), 3.0, epsilon = 1e-12);
        // pairs: (A,B): 0.5+1, (A,C): 0.5+1 -> 0.5 * 2 * (2 * 2.25)
        assert_relative_eq!(w.s1(), 4.5, epsilon = 1e-12);
        // A: (1 + 2)^2, B: (1 + 0.5)^2, C: (1 + 0.5)^2
        assert_relative_eq!(w.s2(), 13.5, epsilon = 1e-12);
    }

    #[test]
    fn test_moments_asymmetric() {
        let w = WeightsMatrix::from_neighbor_lists(vec![("a", vec!["b"]), ("b", vec![])]).unwrap();
        assert_relative_eq!(w.s0(), 1.0);
        // (w_ab + w_ba)^2 counted for (a,b) and (b,a), halved
        assert_relative_eq!(w.s1(), 1.0);
        assert_relative_eq!(w.s2(), 2.0);
        assert_eq!(w.asymmetries(), vec![(0, 1)]);
        assert!(!w.is_symmetric());
    }

    #[test]
    fn test_triples_and_full() {
        let w = abc();
        let t = w.triples();
        assert_eq!(t.len(), 4);
        assert_eq!(t[0], Triple { focal: 0, neighbor: 1, weight: 1.0 });
        assert_eq!(t[1], Triple { focal: 0, neighbor: 2, weight: 1.0 });

        let dense = w.full();
        assert_eq!(dense[[0, 1]], 1.0);
        assert_eq!(dense[[1, 2]], 0.0);
        assert_eq!(dense.sum(), 4.0);
        assert!(w.is_symmetric());
    }

    #[test]
    fn test_with_transform_restores() {
        let mut w = abc();
        w.set_transform(Transform::RowStandardized);
        let s0 = w.with_transform(Transform::Binary, |wb| wb.s0());
        assert_eq!(s0, 4.0);
        assert_eq!(w.transform(), Transform::RowStandardized);
        assert_relative_eq!(w.s0(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_summary_accessors() {
        let w = abc();
        assert_eq!(w.cardinalities(), vec![2, 1, 1]);
        assert_relative_eq!(w.mean_neighbors(), 4.0 / 3.0);
        assert_relative_eq!(w.pct_nonzero(), 400.0 / 9.0);
        assert_eq!(w.id_index("C"), Some(2));
        assert_eq!(w.id_index("Z"), None);
    }
}
