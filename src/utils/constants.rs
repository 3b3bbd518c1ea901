//! Constants Module - Single Source of Truth
//!
//! Every constant used by the scoring core lives here: feature layout,
//! numeric guards, risk-band cut-offs and training defaults.
//! No hardcoded values in other modules.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "LoanRisk";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// FEATURE LAYOUT
// ============================================

/// Number of model features (7 raw + 2 derived)
pub const NUM_FEATURES: usize = 9;

/// Feature names in positional order. Weights are positional, so this order
/// is shared by training, inference, explanation and the artifact format.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "annual_income",
    "employment_years",
    "credit_score",
    "existing_debt",
    "loan_amount",
    "loan_term_months",
    "interest_rate",
    "dti", // existing_debt / annual_income
    "lti", // loan_amount / annual_income
];

/// Floor applied to annual income when computing dti / lti
pub const MIN_INCOME_DENOMINATOR: f64 = 1.0;

// ============================================
// NUMERIC GUARDS
// ============================================

/// Logit is clamped to [-SIGMOID_CLAMP, SIGMOID_CLAMP] before exp()
pub const SIGMOID_CLAMP: f64 = 60.0;

/// Replacement for a zero standard deviation
pub const ZERO_STD_REPLACEMENT: f64 = 1.0;

/// Standard deviation of the initial weight draw
pub const INIT_WEIGHT_STD: f64 = 0.01;

// ============================================
// TRAINING DEFAULTS
// ============================================

pub const DEFAULT_LEARNING_RATE: f64 = 0.2;
pub const DEFAULT_STEPS: usize = 1200;
pub const DEFAULT_L2: f64 = 0.08;
pub const DEFAULT_THRESHOLD: f64 = 0.5;
pub const DEFAULT_SEED: u64 = 7;

/// Labeled loans required before training is attempted
pub const MIN_LABELED_ROWS: usize = 50;

// ============================================
// INFERENCE / EXPLANATION
// ============================================

/// Default number of reason codes returned by the explainer
pub const DEFAULT_TOP_K: usize = 5;

/// Probability below this is LOW risk
pub const BAND_LOW_UPPER: f64 = 0.33;

/// Probability below this (and >= BAND_LOW_UPPER) is MEDIUM risk
pub const BAND_MEDIUM_UPPER: f64 = 0.66;

// ============================================
// PROCESS WIRING DEFAULTS
// ============================================

/// Default model artifact location (binary only; the core takes a path)
pub const DEFAULT_MODEL_PATH: &str = "artifacts/model.json";

/// Default synthetic dataset size
pub const DEFAULT_SYNTH_CUSTOMERS: usize = 400;
pub const DEFAULT_LOANS_PER_CUSTOMER: usize = 2;

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|f| *f == name)
}

/// Owned copy of the feature names (artifact representation)
pub fn feature_names_owned() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}
