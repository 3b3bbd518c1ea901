//! Loan Risk Library
//!
//! Default-risk scoring for a demo bank-loan store:
//! - Feature building (7 raw attributes + dti / lti ratios)
//! - Standardized logistic regression trained by full-batch gradient descent
//! - Probability, label and risk-band inference
//! - Weight-times-standardized-value reason codes
//! - JSON model artifacts

pub mod core;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod utils;

pub use crate::core::{
    build_feature_row, build_features_matrix, evaluate, explain_instance, sigmoid,
    train_logistic_regression, LogisticModel, Standardizer, Trainer, TrainingMetrics,
};
pub use models::{
    AppConfig, AppError, AppResult, Contribution, ErrorCode, FeatureMatrix, FeatureVector,
    LoanApplication, LoanRecord, Prediction, RiskBand, TrainConfig,
};
pub use pipeline::{score_loan, score_unscored, train_and_save, LoanAssessment, TrainingReport};
pub use providers::{
    load_model, save_model, seed_repository, InMemoryLoanRepository, LoanRepository, ModelStore,
    SeedSummary, SyntheticGenerator,
};
