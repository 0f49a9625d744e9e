//! Normal-approximation inference helpers

use serde::Serialize;

/// Analytic significance of a statistic under a normal approximation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalTest {
    pub variance: f64,
    pub std_error: f64,
    pub z: f64,
    pub p_value: f64,
}

impl NormalTest {
    /// Test `stat` against `expected` with the given variance.
    ///
    /// A non-positive variance yields z = 0 and p = 1. A NaN variance
    /// (formula undefined for this n) propagates as NaN.
    pub fn new(stat: f64, expected: f64, variance: f64, two_tailed: bool) -> Self {
        if variance.is_nan() {
            return Self::undefined();
        }
        if variance <= 0.0 {
            return Self {
                variance,
                std_error: 0.0,
                z: 0.0,
                p_value: 1.0,
            };
        }
        let std_error = variance.sqrt();
        let z = (stat - expected) / std_error;
        Self {
            variance,
            std_error,
            z,
            p_value: normal_p_value(z, two_tailed),
        }
    }

    /// Result for a formula that has no value on this input.
    pub fn undefined() -> Self {
        Self {
            variance: f64::NAN,
            std_error: f64::NAN,
            z: f64::NAN,
            p_value: f64::NAN,
        }
    }

    /// Result reported when the statistic itself is degenerate.
    pub fn null() -> Self {
        Self {
            variance: 0.0,
            std_error: 0.0,
            z: 0.0,
            p_value: 1.0,
        }
    }
}

/// Tail probability of |z| under the standard normal.
pub fn normal_p_value(z: f64, two_tailed: bool) -> f64 {
    let tail = 1.0 - normal_cdf(z.abs());
    if two_tailed {
        (2.0 * tail).min(1.0)
    } else {
        tail
    }
}

/// Approximate CDF of standard normal distribution
/// Uses Abramowitz & Stegun approximation (error < 7.5e-8)
pub fn normal_cdf(x: f64) -> f64 {
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }

    let t = 1.0 / (1.0 + 0.2316419 * x.abs());
    let d = 0.3989422804014327; // 1/sqrt(2*pi)
    let p = d
        * (-x * x / 2.0).exp()
        * (t * (0.3193815 + t * (-0.3565638 + t * (1.781478 + t * (-1.821256 + t * 1.330274)))));

    if x > 0.0 {
        1.0 - p
    } else {
        p
    }
}
