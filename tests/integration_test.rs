//! Integration tests for the loan scoring core

use loan_risk::core::{build_feature_row, build_features_matrix, contributions, explain_instance};
use loan_risk::utils::constants::{FEATURE_NAMES, NUM_FEATURES};
use loan_risk::{
    evaluate, load_model, save_model, score_loan, seed_repository, train_and_save,
    train_logistic_regression, ErrorCode, FeatureVector, InMemoryLoanRepository, LoanApplication,
    LoanRepository, LogisticModel, ModelStore, RiskBand, SyntheticGenerator, TrainConfig,
};

fn application(annual_income: f64, credit_score: f64, existing_debt: f64) -> LoanApplication {
    LoanApplication {
        annual_income,
        employment_years: 5.0,
        credit_score,
        existing_debt,
        loan_amount: 450_000.0,
        loan_term_months: 60.0,
        interest_rate: 12.0,
    }
}

fn reference_application() -> LoanApplication {
    LoanApplication {
        annual_income: 650_000.0,
        employment_years: 5.0,
        credit_score: 700.0,
        existing_debt: 100_000.0,
        loan_amount: 450_000.0,
        loan_term_months: 60.0,
        interest_rate: 12.0,
    }
}

/// Labeled synthetic loan book as (X, y)
fn synthetic_training_set(seed: u64, n: usize) -> (Vec<FeatureVector>, Vec<u8>) {
    let loans = SyntheticGenerator::new(seed).loans(n, true);
    let apps: Vec<LoanApplication> = loans.iter().map(|l| l.application).collect();
    let y: Vec<u8> = loans.iter().map(|l| l.actual_default.unwrap_or(0)).collect();
    (build_features_matrix(&apps), y)
}

fn synthetic_model() -> LogisticModel {
    let (x, y) = synthetic_training_set(7, 800);
    train_logistic_regression(&x, &y, TrainConfig::default()).unwrap()
}

#[test]
fn test_separable_credit_score_accuracy() {
    // label = 1 iff credit_score < 500, 100 rows
    let apps: Vec<LoanApplication> = (0..100)
        .map(|i| {
            let score = 300.0 + (i as f64) * 5.5;
            let income = 400_000.0 + ((i * 7919) % 97) as f64 * 2_500.0;
            application(income, score, 80_000.0 + ((i * 31) % 13) as f64 * 1_000.0)
        })
        .collect();
    let y: Vec<u8> = apps.iter().map(|a| u8::from(a.credit_score < 500.0)).collect();
    let x = build_features_matrix(&apps);

    let model = train_logistic_regression(&x, &y, TrainConfig::default()).unwrap();
    let metrics = evaluate(&model, &x, &y).unwrap();
    assert!(metrics.train_accuracy > 0.9, "accuracy {}", metrics.train_accuracy);
}

#[test]
fn test_probabilities_strictly_inside_unit_interval() {
    let model = synthetic_model();
    let (x, _) = synthetic_training_set(99, 500);
    for p in model.predict_proba(&x) {
        assert!(p > 0.0 && p < 1.0, "p = {}", p);
    }
}

#[test]
fn test_predict_agrees_with_threshold() {
    let (x, y) = synthetic_training_set(7, 400);
    for threshold in [0.2, 0.5, 0.8] {
        let model =
            train_logistic_regression(&x, &y, TrainConfig::default().with_threshold(threshold))
                .unwrap();
        let p = model.predict_proba(&x);
        let labels = model.predict(&x);
        for (pi, li) in p.iter().zip(&labels) {
            assert_eq!(*li == 1, *pi >= threshold);
        }
    }
}

#[test]
fn test_training_is_bit_reproducible() {
    let (x, y) = synthetic_training_set(21, 300);
    let a = train_logistic_regression(&x, &y, TrainConfig::default()).unwrap();
    let b = train_logistic_regression(&x, &y, TrainConfig::default()).unwrap();
    let bits = |m: &LogisticModel| m.weights().iter().map(|w| w.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.bias().to_bits(), b.bias().to_bits());
}

#[test]
fn test_constant_column_standardizes_to_zero() {
    let (mut x, y) = synthetic_training_set(3, 200);
    for row in x.iter_mut() {
        row[5] = 36.0; // every loan on a 36-month term
    }
    let model = train_logistic_regression(&x, &y, TrainConfig::default()).unwrap();
    assert_eq!(model.std()[5], 1.0);
    assert_eq!(model.standardize(&x[0])[5], 0.0);
}

#[test]
fn test_artifact_round_trip() {
    let model = synthetic_model();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("artifacts").join("model.json");
    save_model(&model, &path).unwrap();
    let back = load_model(&path).unwrap();
    assert_eq!(back, model);
    assert_eq!(back.feature_names(), FEATURE_NAMES.map(String::from).as_slice());
    for (a, b) in back.weights().iter().zip(model.weights()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for key in ["feature_names", "mean_", "std_", "weights", "bias", "threshold"] {
        assert!(raw.get(key).is_some(), "missing key {}", key);
    }
}

#[test]
fn test_artifact_without_threshold_defaults() {
    let model = synthetic_model();
    let mut raw = serde_json::to_value(&model).unwrap();
    raw.as_object_mut().unwrap().remove("threshold");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old_model.json");
    std::fs::write(&path, serde_json::to_string_pretty(&raw).unwrap()).unwrap();

    let loaded = load_model(&path).unwrap();
    assert_eq!(loaded.threshold(), 0.5);
    assert_eq!(loaded.weights(), model.weights());
}

#[test]
fn test_explanation_top_k() {
    let model = synthetic_model();
    let row = build_feature_row(&reference_application());

    let top5 = explain_instance(&model, &row, 5);
    assert_eq!(top5.len(), 5);
    for pair in top5.windows(2) {
        assert!(pair[0].contribution.abs() >= pair[1].contribution.abs());
    }

    let mut all = explain_instance(&model, &row, NUM_FEATURES);
    let mut full = contributions(&model, &row);
    all.sort_by(|a, b| a.feature.cmp(&b.feature));
    full.sort_by(|a, b| a.feature.cmp(&b.feature));
    assert_eq!(all, full);
}

#[test]
fn test_zero_income_ratios() {
    let row = build_feature_row(&application(0.0, 700.0, 500.0));
    assert_eq!(row[7], 500.0);
    assert_eq!(row[8], 450_000.0);
}

#[test]
fn test_reference_application_end_to_end() {
    let repo = InMemoryLoanRepository::new();
    let mut generator = SyntheticGenerator::new(7);
    seed_repository(&repo, &mut generator, 400, 2).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("model.json"));
    let report = train_and_save(&repo, &store, TrainConfig::default(), 50).unwrap();
    assert_eq!(report.metrics.rows, 800);
    assert!(report.metrics.train_accuracy >= 1.0 - report.metrics.default_rate_baseline - 0.05);

    let model = store.load().unwrap();
    let customer_id = repo.customer(1).unwrap().customer_id;
    let officer_id = repo.first_officer_id().unwrap();
    let loan_id = repo
        .insert_loan(loan_risk::models::NewLoan {
            customer_id,
            officer_id,
            application: reference_application(),
            officer_decision_approve: 1,
            actual_default: None,
        })
        .unwrap();

    let assessment = score_loan(&repo, &model, loan_id, 5).unwrap();
    assert!((0.0..=1.0).contains(&assessment.probability));
    assert_eq!(assessment.risk_band, RiskBand::from_probability(assessment.probability));
    assert_eq!(
        assessment.predicted_label,
        u8::from(assessment.probability >= model.threshold())
    );
    assert_eq!(assessment.explanation.len(), 5);

    let stored = repo.loan(loan_id).unwrap();
    assert_eq!(stored.ai_default_prob, Some(assessment.probability));
}

#[test]
fn test_error_taxonomy_surfaces_codes() {
    let repo = InMemoryLoanRepository::new();
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("model.json"));

    let err = train_and_save(&repo, &store, TrainConfig::default(), 50).unwrap_err();
    assert_eq!(err.code, ErrorCode::TrainInsufficientData);

    let err = store.load().unwrap_err();
    assert_eq!(err.code, ErrorCode::ModelNotFound);

    let err = LoanApplication::from_json_str(r#"{"annual_income": "lots"}"#).unwrap_err();
    assert_eq!(err.code, ErrorCode::InputNonNumeric);
}
