//! Standardizer
//!
//! Per-column mean / population standard deviation, frozen at training time
//! and stored inside the model. A zero standard deviation is replaced by 1
//! through `effective_std`, which both training and inference go through.

use crate::models::types::FeatureVector;
use crate::utils::constants::{NUM_FEATURES, ZERO_STD_REPLACEMENT};

/// Standard deviation used for division
#[inline]
pub fn effective_std(sd: f64) -> f64 {
    if sd == 0.0 {
        ZERO_STD_REPLACEMENT
    } else {
        sd
    }
}

/// Frozen normalization parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    pub mean: FeatureVector,
    /// Already zero-substituted
    pub std: FeatureVector,
}

impl Standardizer {
    /// Fit on a non-empty matrix (divides by n, not n-1)
    pub fn fit(x: &[FeatureVector]) -> Self {
        let n = x.len() as f64;
        let mut mean = [0.0; NUM_FEATURES];
        for row in x {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }

        let mut var = [0.0; NUM_FEATURES];
        for row in x {
            for j in 0..NUM_FEATURES {
                let d = row[j] - mean[j];
                var[j] += d * d;
            }
        }
        let mut std = [0.0; NUM_FEATURES];
        for j in 0..NUM_FEATURES {
            std[j] = effective_std((var[j] / n).sqrt());
        }

        Self { mean, std }
    }

    /// Rebuild from stored model statistics
    pub fn from_parts(mean: &[f64], std: &[f64]) -> Self {
        let mut m = [0.0; NUM_FEATURES];
        let mut s = [ZERO_STD_REPLACEMENT; NUM_FEATURES];
        for j in 0..NUM_FEATURES.min(mean.len()).min(std.len()) {
            m[j] = mean[j];
            s[j] = effective_std(std[j]);
        }
        Self { mean: m, std: s }
    }

    /// Standardize a single row
    pub fn transform_row(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; NUM_FEATURES];
        for j in 0..NUM_FEATURES {
            out[j] = (row[j] - self.mean[j]) / self.std[j];
        }
        out
    }

    /// Standardize a matrix
    pub fn transform(&self, x: &[FeatureVector]) -> Vec<FeatureVector> {
        x.iter().map(|row| self.transform_row(row)).collect()
    }
}
