//! Pipeline Module - Training & Scoring Flows
//!
//! Glue between the loan repository, the scoring core and the model store:
//! - train: labeled loans → features → trainer → metrics → artifact
//! - score: loan row → features → model → write-back + reason codes
//!
//! Training builds a complete new model before anything is persisted, so a
//! failed run leaves the previous artifact untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::explainer::explain_instance;
use crate::core::features::{build_feature_row, build_features_matrix};
use crate::core::model::LogisticModel;
use crate::core::trainer::{evaluate, Trainer, TrainingMetrics};
use crate::models::config::TrainConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Contribution, LoanApplication, LoanRecord, RiskBand};
use crate::providers::model_store::ModelStore;
use crate::providers::repository::LoanRepository;

/// Result of a successful training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub metrics: TrainingMetrics,
    pub artifact: PathBuf,
    pub trained_at: DateTime<Utc>,
}

impl TrainingReport {
    pub fn summary(&self) -> String {
        format!(
            "Trained model saved to: {}\nTrain accuracy (on synthetic data): {:.4}\nDefault rate baseline: {:.4}",
            self.artifact.display(),
            self.metrics.train_accuracy,
            self.metrics.default_rate_baseline
        )
    }
}

/// Train on every labeled loan and persist the model.
///
/// Fails with `TRAIN_INSUFFICIENT_DATA` (training not attempted) when fewer
/// than `min_labeled_rows` labeled loans exist.
pub fn train_and_save<R: LoanRepository + ?Sized>(
    repo: &R,
    store: &ModelStore,
    config: TrainConfig,
    min_labeled_rows: usize,
) -> AppResult<TrainingReport> {
    let labeled = repo.labeled_loans()?;
    if labeled.len() < min_labeled_rows {
        warn!(
            "⚠️ Only {} labeled loans, need {}",
            labeled.len(),
            min_labeled_rows
        );
        return Err(AppError::insufficient_data(labeled.len(), min_labeled_rows));
    }

    let (apps, y): (Vec<LoanApplication>, Vec<u8>) = labeled
        .iter()
        .filter_map(|r| r.actual_default.map(|label| (r.application, label)))
        .unzip();
    let x = build_features_matrix(&apps);

    let model = Trainer::new(config).fit(&x, &y)?;
    let metrics = evaluate(&model, &x, &y)?;
    store.save(&model)?;

    info!(
        "📊 Train accuracy={:.4}, default rate baseline={:.4}, rows={}",
        metrics.train_accuracy, metrics.default_rate_baseline, metrics.rows
    );

    Ok(TrainingReport {
        metrics,
        artifact: store.path().to_path_buf(),
        trained_at: Utc::now(),
    })
}

/// Scored loan with its reason codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAssessment {
    pub loan_id: u64,
    pub probability: f64,
    pub predicted_label: u8,
    pub risk_band: RiskBand,
    pub explanation: Vec<Contribution>,
}

impl LoanAssessment {
    /// Console report
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Stored loan_id: {}\nAI default probability: {:.4}  |  AI prediction (1=default): {}  |  Risk band: {} {}\nTop contributing features (standardized * weight):",
            self.loan_id,
            self.probability,
            self.predicted_label,
            self.risk_band.emoji(),
            self.risk_band
        );
        for c in &self.explanation {
            out.push_str(&format!("\n  - {}: {:+.4}", c.feature, c.contribution));
        }
        out
    }
}

/// Score one stored loan, write the prediction back, and explain it
pub fn score_loan<R: LoanRepository + ?Sized>(
    repo: &R,
    model: &LogisticModel,
    loan_id: u64,
    top_k: usize,
) -> AppResult<LoanAssessment> {
    let record = repo.loan(loan_id)?;
    score_record(repo, model, &record, top_k)
}

fn score_record<R: LoanRepository + ?Sized>(
    repo: &R,
    model: &LogisticModel,
    record: &LoanRecord,
    top_k: usize,
) -> AppResult<LoanAssessment> {
    let row = build_feature_row(&record.application);
    let prediction = model.predict_one(&row);
    repo.persist_prediction(record.loan_id, prediction.probability, prediction.label)?;

    Ok(LoanAssessment {
        loan_id: record.loan_id,
        probability: prediction.probability,
        predicted_label: prediction.label,
        risk_band: prediction.band,
        explanation: explain_instance(model, &row, top_k),
    })
}

/// Load the stored model and score every loan that has no prediction yet
pub fn score_unscored<R: LoanRepository + ?Sized>(
    repo: &R,
    store: &ModelStore,
    top_k: usize,
) -> AppResult<Vec<LoanAssessment>> {
    let model = store.load()?;
    let pending = repo.unscored_loans()?;
    info!("🔎 Scoring {} loans", pending.len());
    pending
        .iter()
        .map(|record| score_record(repo, &model, record, top_k))
        .collect()
}
