//! Logistic Model
//!
//! Standardized logistic regression over the 9-feature loan layout.
//! The model carries its own training-time normalization (`mean_`, `std_`)
//! so inference reproduces training scaling exactly. Instances are immutable:
//! they come out of the trainer or the model store and are never updated in
//! place; retraining produces a new instance.
//!
//! Serialized layout (JSON):
//! `{ feature_names, mean_, std_, weights, bias, threshold }`,
//! `threshold` optional on read (defaults to 0.5).

use serde::{Deserialize, Serialize};

use super::standardizer::Standardizer;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FeatureVector, Prediction, RiskBand};
use crate::utils::constants::{
    feature_names_owned, DEFAULT_THRESHOLD, FEATURE_NAMES, NUM_FEATURES, SIGMOID_CLAMP,
};

/// Logistic function with the logit clamped to [-60, 60] before exp()
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-SIGMOID_CLAMP, SIGMOID_CLAMP);
    1.0 / (1.0 + (-z).exp())
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Validated on construction and on deserialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelArtifact")]
pub struct LogisticModel {
    feature_names: Vec<String>,
    #[serde(rename = "mean_")]
    mean: Vec<f64>,
    #[serde(rename = "std_")]
    std: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
    threshold: f64,
}

/// Artifact fields as read from disk, before validation
#[derive(Deserialize)]
struct ModelArtifact {
    feature_names: Vec<String>,
    #[serde(rename = "mean_")]
    mean: Vec<f64>,
    #[serde(rename = "std_")]
    std: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

impl TryFrom<ModelArtifact> for LogisticModel {
    type Error = AppError;

    fn try_from(raw: ModelArtifact) -> AppResult<Self> {
        let model = Self {
            feature_names: raw.feature_names,
            mean: raw.mean,
            std: raw.std,
            weights: raw.weights,
            bias: raw.bias,
            threshold: raw.threshold,
        };
        model.validate()?;
        Ok(model)
    }
}

impl LogisticModel {
    /// Assemble a model from its parts, enforcing the layout invariants
    pub fn from_parts(
        mean: Vec<f64>,
        std: Vec<f64>,
        weights: Vec<f64>,
        bias: f64,
        threshold: f64,
    ) -> AppResult<Self> {
        let model = Self {
            feature_names: feature_names_owned(),
            mean,
            std,
            weights,
            bias,
            threshold,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check lengths, feature order and threshold range
    pub fn validate(&self) -> AppResult<()> {
        let lens = [
            ("feature_names", self.feature_names.len()),
            ("mean_", self.mean.len()),
            ("std_", self.std.len()),
            ("weights", self.weights.len()),
        ];
        for (name, len) in lens {
            if len != NUM_FEATURES {
                return Err(AppError::invalid_artifact(format!(
                    "{} has {} entries, expected {}",
                    name, len, NUM_FEATURES
                )));
            }
        }
        if self
            .feature_names
            .iter()
            .zip(FEATURE_NAMES.iter())
            .any(|(got, want)| got != want)
        {
            return Err(AppError::invalid_artifact(format!(
                "feature_names {:?} do not match expected order {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(AppError::invalid_artifact(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Training-time normalization (zero std already replaced by 1)
    pub fn standardizer(&self) -> Standardizer {
        Standardizer::from_parts(&self.mean, &self.std)
    }

    /// Standardize one row with the stored statistics
    pub fn standardize(&self, row: &FeatureVector) -> FeatureVector {
        self.standardizer().transform_row(row)
    }

    fn score_standardized(&self, xn: &FeatureVector) -> f64 {
        xn.iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.bias
    }

    /// Logit `Xn·w + b` for one row
    pub fn linear_score(&self, row: &FeatureVector) -> f64 {
        self.score_standardized(&self.standardize(row))
    }

    /// Default probability per row
    pub fn predict_proba(&self, x: &[FeatureVector]) -> Vec<f64> {
        let scaler = self.standardizer();
        x.iter()
            .map(|row| sigmoid(self.score_standardized(&scaler.transform_row(row))))
            .collect()
    }

    /// 1 where probability >= threshold, else 0
    pub fn predict(&self, x: &[FeatureVector]) -> Vec<u8> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| self.label_for(p))
            .collect()
    }

    /// Label for a probability; ties go to the positive class
    pub fn label_for(&self, probability: f64) -> u8 {
        u8::from(probability >= self.threshold)
    }

    /// Probability, label and risk band for a single row
    pub fn predict_one(&self, row: &FeatureVector) -> Prediction {
        let probability = sigmoid(self.linear_score(row));
        Prediction {
            probability,
            label: self.label_for(probability),
            band: RiskBand::from_probability(probability),
        }
    }
}
