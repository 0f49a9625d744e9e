//! Spatial lag operator

use spatlag_core::{Error, Result};

use super::WeightsMatrix;

impl WeightsMatrix {
    /// Spatial lag `W · values` under the active transform.
    ///
    /// `values` must follow matrix id order. Islands get 0. NaN neighbour
    /// values contribute nothing to the sum.
    ///
    /// # Errors
    /// `LengthMismatch` if `values.len() != self.n()`.
    pub fn lag(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.n() {
            return Err(Error::LengthMismatch {
                expected: self.n(),
                actual: values.len(),
            });
        }

        Ok(self.lag_unchecked(values))
    }

    /// Lag without the length check; `values.len()` must equal `n()`.
    pub(crate) fn lag_unchecked(&self, values: &[f64]) -> Vec<f64> {
        (0..self.n())
            .map(|i| {
                self.neighbors(i)
                    .iter()
                    .zip(self.weights(i))
                    .map(|(&j, &w)| {
                        let v = values[j];
                        if v.is_nan() {
                            0.0
                        } else {
                            w * v
                        }
                    })
                    .sum::<f64>()
            })
            .collect()
    }
}

/// Free-function form of [`WeightsMatrix::lag`].
pub fn spatial_lag(w: &WeightsMatrix, values: &[f64]) -> Result<Vec<f64>> {
    w.lag(values)
}
