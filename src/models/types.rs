//! Type definitions for the loan scoring core
//! Raw loan records, feature layout, predictions and reason codes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{AppError, AppResult};
use crate::utils::constants::{BAND_LOW_UPPER, BAND_MEDIUM_UPPER, NUM_FEATURES};

/// One loan in model feature space, ordered as `FEATURE_NAMES`
pub type FeatureVector = [f64; NUM_FEATURES];

/// One feature vector per loan, same column order for every row
pub type FeatureMatrix = Vec<FeatureVector>;

/// Raw loan attributes needed by the feature builder.
///
/// Validated once at the data-access boundary; everything downstream works
/// on this fixed-field record instead of an arbitrary key-value row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub annual_income: f64,
    pub employment_years: f64,
    pub credit_score: f64,
    pub existing_debt: f64,
    pub loan_amount: f64,
    pub loan_term_months: f64,
    pub interest_rate: f64,
}

impl LoanApplication {
    /// Required keys of a raw row, in feature order
    pub const FIELDS: [&'static str; 7] = [
        "annual_income",
        "employment_years",
        "credit_score",
        "existing_debt",
        "loan_amount",
        "loan_term_months",
        "interest_rate",
    ];

    /// Validate a dynamically typed row (e.g. a JSON object from a UI or DB driver).
    ///
    /// Finite numbers and numeric strings are accepted; anything else is rejected
    /// with `INPUT_NON_NUMERIC`, an absent key with `INPUT_MISSING_FIELD`.
    pub fn from_record(record: &Map<String, Value>) -> AppResult<Self> {
        let mut values = [0.0f64; 7];
        for (slot, field) in values.iter_mut().zip(Self::FIELDS) {
            let raw = record.get(field).ok_or_else(|| AppError::missing_field(field))?;
            *slot = numeric_value(field, raw)?;
        }
        let [annual_income, employment_years, credit_score, existing_debt, loan_amount, loan_term_months, interest_rate] =
            values;
        Ok(Self {
            annual_income,
            employment_years,
            credit_score,
            existing_debt,
            loan_amount,
            loan_term_months,
            interest_rate,
        })
    }

    /// Parse a JSON object string into an application
    pub fn from_json_str(input: &str) -> AppResult<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| AppError::invalid_input(format!("row is not valid JSON: {}", e)))?;
        match value {
            Value::Object(map) => Self::from_record(&map),
            other => Err(AppError::invalid_input(format!(
                "row must be a JSON object, got {}",
                other
            ))),
        }
    }
}

fn numeric_value(field: &str, raw: &Value) -> AppResult<f64> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // "NaN" / "inf" parse as f64 but are not usable loan figures
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::non_numeric(field, raw))
}

/// A stored loan with its optional outcome and model score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: u64,
    pub customer_id: u64,
    pub officer_id: u64,
    pub application: LoanApplication,
    /// Officer's rule-of-thumb decision (1 = approve)
    pub officer_decision_approve: u8,
    /// 1 = defaulted, 0 = repaid, None = not yet known
    pub actual_default: Option<u8>,
    pub ai_default_prob: Option<f64>,
    pub ai_default_pred: Option<u8>,
}

impl LoanRecord {
    pub fn is_labeled(&self) -> bool {
        self.actual_default.is_some()
    }

    pub fn is_scored(&self) -> bool {
        self.ai_default_prob.is_some()
    }
}

/// Customer master data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: u64,
    pub full_name: String,
    pub age: u32,
    pub gender: String,
    pub city: String,
    pub phone: String,
}

/// Loan officer master data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOfficer {
    pub officer_id: u64,
    pub full_name: String,
    pub branch_name: String,
    pub experience_years: u32,
}

/// Customer fields supplied on insert (id assigned by the repository)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub full_name: String,
    pub age: u32,
    pub gender: String,
    pub city: String,
    pub phone: String,
}

/// Officer fields supplied on insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOfficer {
    pub full_name: String,
    pub branch_name: String,
    pub experience_years: u32,
}

/// Loan fields supplied on insert; never carries a model score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub customer_id: u64,
    pub officer_id: u64,
    pub application: LoanApplication,
    pub officer_decision_approve: u8,
    pub actual_default: Option<u8>,
}

/// Three-level bucketing of a default probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// p < 0.33 → LOW, p < 0.66 → MEDIUM, otherwise HIGH
    pub fn from_probability(p: f64) -> Self {
        if p < BAND_LOW_UPPER {
            Self::Low
        } else if p < BAND_MEDIUM_UPPER {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "LOW",
            RiskBand::Medium => "MEDIUM",
            RiskBand::High => "HIGH",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskBand::Low => "🟢",
            RiskBand::Medium => "🟡",
            RiskBand::High => "🔴",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model output for a single loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    /// 1 = predicted default
    pub label: u8,
    pub band: RiskBand,
}

/// One reason code: a feature's additive share of the logit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    pub contribution: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_from_record_accepts_numbers_and_numeric_strings() {
        let row = record(json!({
            "annual_income": 650000,
            "employment_years": "5",
            "credit_score": 700.0,
            "existing_debt": 100000,
            "loan_amount": 450000,
            "loan_term_months": 60,
            "interest_rate": " 12.5 ",
            "customer_name": "ignored"
        }));
        let app = LoanApplication::from_record(&row).unwrap();
        assert_eq!(app.annual_income, 650000.0);
        assert_eq!(app.employment_years, 5.0);
        assert_eq!(app.interest_rate, 12.5);
    }

    #[test]
    fn test_from_record_missing_field() {
        let row = record(json!({
            "annual_income": 650000,
            "employment_years": 5,
            "credit_score": 700
        }));
        let err = LoanApplication::from_record(&row).unwrap_err();
        assert_eq!(err.code, ErrorCode::InputMissingField);
        assert!(err.message.contains("existing_debt"));
    }

    #[test]
    fn test_from_record_non_numeric() {
        let row = record(json!({
            "annual_income": 650000,
            "employment_years": 5,
            "credit_score": "excellent",
            "existing_debt": 100000,
            "loan_amount": 450000,
            "loan_term_months": 60,
            "interest_rate": 12
        }));
        let err = LoanApplication::from_record(&row).unwrap_err();
        assert_eq!(err.code, ErrorCode::InputNonNumeric);

        let row = record(json!({
            "annual_income": null,
            "employment_years": 5,
            "credit_score": 700,
            "existing_debt": 100000,
            "loan_amount": 450000,
            "loan_term_months": 60,
            "interest_rate": 12
        }));
        let err = LoanApplication::from_record(&row).unwrap_err();
        assert_eq!(err.code, ErrorCode::InputNonNumeric);
    }

    #[test]
    fn test_from_record_rejects_non_finite_strings() {
        for raw in ["NaN", "inf", "-inf", " Infinity "] {
            let row = record(json!({
                "annual_income": raw,
                "employment_years": 5,
                "credit_score": 700,
                "existing_debt": 100000,
                "loan_amount": 450000,
                "loan_term_months": 60,
                "interest_rate": 12
            }));
            let err = LoanApplication::from_record(&row).unwrap_err();
            assert_eq!(err.code, ErrorCode::InputNonNumeric, "{:?} accepted", raw);
            assert!(err.message.contains("annual_income"));
        }
    }

    #[test]
    fn test_from_json_str_rejects_non_object() {
        let err = LoanApplication::from_json_str("[1, 2, 3]").unwrap_err();
        assert_eq!(err.code, ErrorCode::InputInvalid);
    }

    #[test]
    fn test_risk_band_boundaries() {
        assert_eq!(RiskBand::from_probability(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.3299), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.33), RiskBand::Medium);
        assert_eq!(RiskBand::from_probability(0.6599), RiskBand::Medium);
        assert_eq!(RiskBand::from_probability(0.66), RiskBand::High);
        assert_eq!(RiskBand::from_probability(1.0), RiskBand::High);
        assert_eq!(RiskBand::High.to_string(), "HIGH");
    }
}
