//! Configuration module
//!
//! Training hyperparameters and process wiring, read from the environment.
//! Defaults come from utils/constants.rs. No paths are hardcoded in the core;
//! only `AppConfig` knows where the artifact lives.

use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use crate::utils::constants::{
    DEFAULT_L2, DEFAULT_LEARNING_RATE, DEFAULT_LOANS_PER_CUSTOMER, DEFAULT_MODEL_PATH,
    DEFAULT_SEED, DEFAULT_STEPS, DEFAULT_SYNTH_CUSTOMERS, DEFAULT_THRESHOLD, DEFAULT_TOP_K,
    MIN_LABELED_ROWS,
};

/// Read `key` from the environment, falling back to `default` when unset or unparsable
fn env_or<T: FromStr + Copy + std::fmt::Debug>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("⚠️ {}={:?} is invalid, using default {:?}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

/// Gradient-descent hyperparameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    /// Step size
    pub learning_rate: f64,
    /// Exact number of full-batch iterations (no early stopping)
    pub steps: usize,
    /// L2 penalty, applied to the weight gradient only
    pub l2: f64,
    /// Decision threshold stored in the model
    pub threshold: f64,
    /// Seed for the initial weight draw
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            steps: DEFAULT_STEPS,
            l2: DEFAULT_L2,
            threshold: DEFAULT_THRESHOLD,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainConfig {
    /// Defaults overridden by LOAN_RISK_LR, LOAN_RISK_STEPS, LOAN_RISK_L2,
    /// LOAN_RISK_THRESHOLD and LOAN_RISK_SEED
    pub fn from_env() -> Self {
        let d = Self::default();
        let mut cfg = Self {
            learning_rate: env_or("LOAN_RISK_LR", d.learning_rate),
            steps: env_or("LOAN_RISK_STEPS", d.steps),
            l2: env_or("LOAN_RISK_L2", d.l2),
            threshold: env_or("LOAN_RISK_THRESHOLD", d.threshold),
            seed: env_or("LOAN_RISK_SEED", d.seed),
        };
        if !(0.0..=1.0).contains(&cfg.threshold) {
            warn!("⚠️ threshold {} outside [0,1], using default", cfg.threshold);
            cfg.threshold = d.threshold;
        }
        cfg
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Process-level settings for the binary
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Model artifact location
    pub model_path: PathBuf,
    /// Labeled loans required before training
    pub min_labeled_rows: usize,
    /// Reason codes per assessment
    pub top_k: usize,
    /// Synthetic dataset size
    pub synth_customers: usize,
    pub loans_per_customer: usize,
    pub synth_seed: u64,
    pub train: TrainConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            min_labeled_rows: MIN_LABELED_ROWS,
            top_k: DEFAULT_TOP_K,
            synth_customers: DEFAULT_SYNTH_CUSTOMERS,
            loans_per_customer: DEFAULT_LOANS_PER_CUSTOMER,
            synth_seed: DEFAULT_SEED,
            train: TrainConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            model_path: std::env::var("LOAN_RISK_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(d.model_path),
            min_labeled_rows: env_or("LOAN_RISK_MIN_LABELED", d.min_labeled_rows),
            top_k: env_or("LOAN_RISK_TOP_K", d.top_k),
            synth_customers: env_or("LOAN_RISK_CUSTOMERS", d.synth_customers),
            loans_per_customer: env_or("LOAN_RISK_LOANS_PER_CUSTOMER", d.loans_per_customer),
            synth_seed: env_or("LOAN_RISK_SYNTH_SEED", d.synth_seed),
            train: TrainConfig::from_env(),
        }
    }
}
