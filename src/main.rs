//! Loan Risk - default-risk scoring demo
//!
//! Usage:
//!   loan_risk seed            generate a synthetic loan book and summarize it
//!   loan_risk train           seed, train, save the model artifact
//!   loan_risk score [id]      score a reference application (trains first if needed),
//!                             filed under existing customer `id` or a new customer
//!   loan_risk assess '<json>' score one JSON row against the saved model
//!
//! Environment:
//!   LOAN_RISK_MODEL_PATH - artifact location (default: artifacts/model.json)
//!   LOAN_RISK_LR / _STEPS / _L2 / _THRESHOLD / _SEED - training overrides
//!   RUST_LOG             - log level (default: info)

use eyre::{bail, Result, WrapErr};
use loan_risk::core::{build_feature_row, explain_instance};
use loan_risk::models::{LoanApplication, NewCustomer, NewLoan};
use loan_risk::utils::constants::{APP_NAME, APP_VERSION};
use loan_risk::{
    score_loan, seed_repository, train_and_save, AppConfig, InMemoryLoanRepository, LoanRepository,
    ModelStore, SyntheticGenerator,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env();
    let store = ModelStore::new(&config.model_path);
    let args: Vec<String> = std::env::args().skip(1).collect();

    info!("🏦 {} v{}", APP_NAME, APP_VERSION);

    match args.first().map(String::as_str) {
        Some("seed") => {
            let (_, summary) = seeded_repository(&config)?;
            println!(
                "Customers: {}, Loans: {}, Labeled loans: {}, Default rate: {:.4}",
                summary.customers, summary.loans, summary.labeled, summary.default_rate
            );
        }
        Some("train") => {
            let (repo, _) = seeded_repository(&config)?;
            let report = train_and_save(&repo, &store, config.train, config.min_labeled_rows)?;
            println!("{}", report.summary());
        }
        Some("score") => {
            let customer_id = args
                .get(1)
                .map(|raw| raw.parse::<u64>())
                .transpose()
                .wrap_err("customer_id must be a positive integer")?;
            let (repo, _) = seeded_repository(&config)?;
            if !store.exists() {
                info!("No model at {}, training one first", store.path().display());
                train_and_save(&repo, &store, config.train, config.min_labeled_rows)?;
            }
            let model = store.load()?;
            let loan_id = insert_reference_application(&repo, customer_id)?;
            let assessment = score_loan(&repo, &model, loan_id, config.top_k)?;
            println!("{}", assessment.summary());
        }
        Some("assess") => {
            let Some(raw) = args.get(1) else {
                bail!("assess needs a JSON row, e.g. '{{\"annual_income\": 650000, ...}}'");
            };
            let model = store.load()?;
            let application = LoanApplication::from_json_str(raw)?;
            let row = build_feature_row(&application);
            let prediction = model.predict_one(&row);
            println!(
                "AI default probability: {:.4}  |  AI prediction (1=default): {}  |  Risk band: {} {}",
                prediction.probability,
                prediction.label,
                prediction.band.emoji(),
                prediction.band
            );
            println!("Top contributing features (standardized * weight):");
            for c in explain_instance(&model, &row, config.top_k) {
                println!("  - {}: {:+.4}", c.feature, c.contribution);
            }
        }
        _ => {
            eprintln!("usage: loan_risk <seed|train|score [customer_id]|assess '<json row>'>");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn seeded_repository(
    config: &AppConfig,
) -> Result<(InMemoryLoanRepository, loan_risk::SeedSummary)> {
    let repo = InMemoryLoanRepository::new();
    let mut generator = SyntheticGenerator::new(config.synth_seed);
    let summary = seed_repository(
        &repo,
        &mut generator,
        config.synth_customers,
        config.loans_per_customer,
    )?;
    Ok((repo, summary))
}

/// Default demo loan, for an existing customer or a newly created one
fn insert_reference_application(
    repo: &InMemoryLoanRepository,
    customer_id: Option<u64>,
) -> Result<u64> {
    let customer_id = match customer_id {
        Some(id) => repo.require_customer(id)?.customer_id,
        None => repo.add_customer(NewCustomer {
            full_name: "New Customer".to_string(),
            age: 30,
            gender: "O".to_string(),
            city: "Kochi".to_string(),
            phone: "+91-0000000000".to_string(),
        }),
    };
    let Some(officer_id) = repo.first_officer_id() else {
        bail!("No loan officers found; seed the repository first");
    };
    let loan_id = repo.insert_loan(NewLoan {
        customer_id,
        officer_id,
        application: LoanApplication {
            annual_income: 650_000.0,
            employment_years: 5.0,
            credit_score: 700.0,
            existing_debt: 100_000.0,
            loan_amount: 450_000.0,
            loan_term_months: 60.0,
            interest_rate: 12.0,
        },
        officer_decision_approve: 1,
        actual_default: None,
    })?;
    Ok(loan_id)
}
