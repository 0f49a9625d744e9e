//! Attribute extraction and lag descriptives

use serde::Serialize;
use spatlag_core::{AttributeValue, DiagnosticKind, Diagnostics, Feature};
use std::collections::HashMap;

/// Read `field` for each id in `ids`, in order.
///
/// Missing, null or non-numeric values become 0 and leave a warning in
/// `diag`.
pub fn extract_values(
    ids: &[String],
    features: &HashMap<String, &Feature>,
    field: &str,
    diag: &mut Diagnostics,
) -> Vec<f64> {
    ids.iter()
        .map(|id| {
            let value = features.get(id).and_then(|f| f.get_property(field));
            match value {
                None | Some(AttributeValue::Null) => {
                    diag.warn_feature(
                        DiagnosticKind::MissingValue,
                        id.as_str(),
                        format!("attribute '{field}' missing, using 0"),
                    );
                    0.0
                }
                Some(v) => v.as_f64().unwrap_or_else(|| {
                    diag.warn_feature(
                        DiagnosticKind::InvalidValue,
                        id.as_str(),
                        format!("attribute '{field}' = {v:?} is not a finite number, using 0"),
                    );
                    0.0
                }),
            }
        })
        .collect()
}

/// Descriptive comparison of values and their spatial lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagSummary {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub lag_mean: f64,
    pub lag_std: f64,
    /// Pearson correlation of values and lag; 0 if either is constant
    pub correlation: f64,
}

impl LagSummary {
    pub fn new(values: &[f64], lag: &[f64]) -> Self {
        let (mean, std) = mean_std(values);
        let (lag_mean, lag_std) = mean_std(lag);

        let correlation = if std > 0.0 && lag_std > 0.0 {
            let cov = values
                .iter()
                .zip(lag)
                .map(|(v, l)| (v - mean) * (l - lag_mean))
                .sum::<f64>()
                / values.len() as f64;
            cov / (std * lag_std)
        } else {
            0.0
        };

        Self {
            mean,
            std,
            lag_mean,
            lag_std,
            correlation,
        }
    }
}

fn mean_std(xs: &[f64]) -> (f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
