//! Summary statistics of ground truth minus prediction.

use crate::error::{Error, Result};

/// Aggregate of one difference vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// `truth[i] - prediction[i]` for every row.
///
/// Alignment is purely positional; lengths must match.
pub fn differences(truth: &[f64], prediction: &[f64]) -> Result<Vec<f64>> {
    if truth.len() != prediction.len() {
        return Err(Error::LengthMismatch {
            expected: truth.len(),
            actual: prediction.len(),
        });
    }
    Ok(truth
        .iter()
        .zip(prediction)
        .map(|(y, p)| y - p)
        .collect())
}

impl DifferenceStats {
    pub fn from_differences(diffs: &[f64]) -> Result<Self> {
        if diffs.is_empty() {
            return Err(Error::EmptyTable);
        }
        // A single NaN makes every statistic NaN.
        if diffs.iter().any(|d| d.is_nan()) {
            return Ok(Self {
                mean: f64::NAN,
                median: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            });
        }
        let n = diffs.len();
        let mean = diffs.iter().sum::<f64>() / n as f64;
        let min = diffs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = diffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut sorted = diffs.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Ok(Self {
            mean,
            median,
            min,
            max,
        })
    }

    /// Statistics of `truth - prediction`.
    pub fn compute(truth: &[f64], prediction: &[f64]) -> Result<Self> {
        Self::from_differences(&differences(truth, prediction)?)
    }
}
