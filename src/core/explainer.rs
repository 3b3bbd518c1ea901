//! Explainer
//!
//! Reason codes for a single loan: contribution_i = standardized_x_i * w_i,
//! ranked by absolute value. This decomposes the pre-sigmoid linear score
//! (minus the bias); it says nothing causal.

use std::cmp::Ordering;

use super::model::LogisticModel;
use crate::models::types::{Contribution, FeatureVector};

/// Per-feature contributions in feature order
pub fn contributions(model: &LogisticModel, row: &FeatureVector) -> Vec<Contribution> {
    let xn = model.standardize(row);
    model
        .feature_names()
        .iter()
        .zip(xn.iter().zip(model.weights()))
        .map(|(name, (x, w))| Contribution {
            feature: name.clone(),
            contribution: x * w,
        })
        .collect()
}

/// Top `top_k` contributions by descending |contribution|.
///
/// Stable sort: exact ties keep feature-definition order.
pub fn explain_instance(model: &LogisticModel, row: &FeatureVector, top_k: usize) -> Vec<Contribution> {
    let mut pairs = contributions(model, row);
    pairs.sort_by(|a, b| {
        b.contribution
            .abs()
            .partial_cmp(&a.contribution.abs())
            .unwrap_or(Ordering::Equal)
    });
    pairs.truncate(top_k);
    pairs
}
