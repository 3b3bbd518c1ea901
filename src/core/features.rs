//! Feature Builder
//!
//! Maps raw loan applications into the fixed 9-column feature layout:
//! the 7 raw attributes followed by two derived ratios
//! - dti = existing_debt / max(annual_income, 1)
//! - lti = loan_amount / max(annual_income, 1)

use crate::models::types::{FeatureMatrix, FeatureVector, LoanApplication};
use crate::utils::constants::MIN_INCOME_DENOMINATOR;

/// Build one feature vector
pub fn build_feature_row(app: &LoanApplication) -> FeatureVector {
    let denom = app.annual_income.max(MIN_INCOME_DENOMINATOR);
    [
        app.annual_income,
        app.employment_years,
        app.credit_score,
        app.existing_debt,
        app.loan_amount,
        app.loan_term_months,
        app.interest_rate,
        app.existing_debt / denom,
        app.loan_amount / denom,
    ]
}

/// Build the feature matrix, one row per application, input order preserved
pub fn build_features_matrix(apps: &[LoanApplication]) -> FeatureMatrix {
    apps.iter().map(build_feature_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::feature_index;

    fn app(annual_income: f64, existing_debt: f64, loan_amount: f64) -> LoanApplication {
        LoanApplication {
            annual_income,
            employment_years: 5.0,
            credit_score: 700.0,
            existing_debt,
            loan_amount,
            loan_term_months: 60.0,
            interest_rate: 12.0,
        }
    }

    #[test]
    fn test_raw_columns_in_order() {
        let row = build_feature_row(&app(650000.0, 100000.0, 450000.0));
        assert_eq!(row[0], 650000.0);
        assert_eq!(row[1], 5.0);
        assert_eq!(row[2], 700.0);
        assert_eq!(row[3], 100000.0);
        assert_eq!(row[4], 450000.0);
        assert_eq!(row[5], 60.0);
        assert_eq!(row[6], 12.0);
    }

    #[test]
    fn test_derived_ratios() {
        let row = build_feature_row(&app(500000.0, 100000.0, 250000.0));
        assert_eq!(row[feature_index("dti").unwrap()], 0.2);
        assert_eq!(row[feature_index("lti").unwrap()], 0.5);
    }

    #[test]
    fn test_zero_income_uses_unit_denominator() {
        let row = build_feature_row(&app(0.0, 500.0, 1200.0));
        assert_eq!(row[7], 500.0);
        assert_eq!(row[8], 1200.0);
    }

    #[test]
    fn test_negative_and_fractional_income_floor() {
        let row = build_feature_row(&app(-10.0, 50.0, 20.0));
        assert_eq!(row[7], 50.0);
        let row = build_feature_row(&app(0.5, 50.0, 20.0));
        assert_eq!(row[7], 50.0);
    }

    #[test]
    fn test_matrix_preserves_row_order() {
        let apps = vec![app(100.0, 1.0, 1.0), app(200.0, 1.0, 1.0), app(300.0, 1.0, 1.0)];
        let x = build_features_matrix(&apps);
        assert_eq!(x.len(), 3);
        assert_eq!(x[0][0], 100.0);
        assert_eq!(x[2][0], 300.0);
        assert!(build_features_matrix(&[]).is_empty());
    }
}
