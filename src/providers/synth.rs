//! Synthetic Loan Generator
//!
//! Produces a demo bank: customers, five loan officers and loans whose
//! default outcome is drawn from a known latent risk score. Higher risk
//! comes from low credit score, high debt/loan-to-income, high interest
//! rate and short employment. Fully determined by the seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::repository::{InMemoryLoanRepository, LoanRepository};
use crate::core::model::sigmoid;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{LoanApplication, NewCustomer, NewLoan, NewOfficer};
use crate::utils::constants::MIN_INCOME_DENOMINATOR;

const FIRST_NAMES: [&str; 12] = [
    "Aarav", "Aditi", "Arjun", "Ananya", "Dev", "Diya", "Ishan", "Kavya", "Nikhil", "Priya", "Rahul", "Sneha",
];
const LAST_NAMES: [&str; 12] = [
    "Sharma", "Nair", "Iyer", "Menon", "Patel", "Reddy", "Khan", "Das", "Gupta", "Singh", "Joshi", "Kumar",
];
const CITIES: [&str; 8] = [
    "Kochi", "Trivandrum", "Kozhikode", "Thrissur", "Bengaluru", "Chennai", "Hyderabad", "Mumbai",
];
const GENDERS: [&str; 3] = ["M", "F", "O"];
const OFFICERS: [(&str, &str); 5] = [
    ("S. Mathew", "Kochi Main"),
    ("R. Nair", "Trivandrum"),
    ("A. Menon", "Kozhikode"),
    ("P. Varma", "Thrissur"),
    ("K. Iqbal", "Bengaluru"),
];
const TERM_CHOICES: [f64; 10] = [12.0, 24.0, 36.0, 48.0, 60.0, 72.0, 120.0, 180.0, 240.0, 360.0];

/// N(mean, sd), the same affine map `rand_distr::Normal` applies
fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    mean + sd * z
}

/// exp(N(mu, sigma))
fn lognormal<R: Rng + ?Sized>(rng: &mut R, mu: f64, sigma: f64) -> f64 {
    normal(rng, mu, sigma).exp()
}

/// A generated loan before it is attached to a customer/officer
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticLoan {
    pub application: LoanApplication,
    pub officer_decision_approve: u8,
    pub actual_default: Option<u8>,
}

/// Seeded generator
pub struct SyntheticGenerator {
    rng: StdRng,
}

impl SyntheticGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    pub fn customers(&mut self, n: usize) -> Vec<NewCustomer> {
        (0..n)
            .map(|_| {
                let first = self.pick(&FIRST_NAMES);
                let last = self.pick(&LAST_NAMES);
                NewCustomer {
                    full_name: format!("{} {}", first, last),
                    age: self.rng.gen_range(21..66),
                    gender: self.pick(&GENDERS).to_string(),
                    city: self.pick(&CITIES).to_string(),
                    phone: format!("+91-{}", self.rng.gen_range(6_000_000_000u64..9_999_999_999)),
                }
            })
            .collect()
    }

    pub fn officers(&mut self) -> Vec<NewOfficer> {
        OFFICERS
            .iter()
            .map(|(name, branch)| NewOfficer {
                full_name: name.to_string(),
                branch_name: branch.to_string(),
                experience_years: self.rng.gen_range(2..25),
            })
            .collect()
    }

    /// `historical = false` leaves the outcome unknown
    pub fn loans(&mut self, n: usize, historical: bool) -> Vec<SyntheticLoan> {
        (0..n).map(|_| self.loan(historical)).collect()
    }

    fn loan(&mut self, historical: bool) -> SyntheticLoan {
        let rng = &mut self.rng;

        let annual_income = lognormal(rng, 650_000f64.ln(), 0.55).clamp(150_000.0, 5_000_000.0);
        let employment_years = f64::from(rng.gen_range(0u32..31));
        let credit_score = normal(rng, 690.0, 70.0).clamp(300.0, 900.0).round();
        let existing_debt = lognormal(rng, 120_000f64.ln(), 0.8).clamp(0.0, 2_500_000.0);
        let loan_amount = lognormal(rng, 450_000f64.ln(), 0.7).clamp(30_000.0, 5_000_000.0);
        let loan_term_months = TERM_CHOICES[rng.gen_range(0..TERM_CHOICES.len())];

        // lower score and longer term → higher rate
        let base_rate = 22.0 - (credit_score - 300.0) * (12.0 / 600.0);
        let term_bump = (loan_term_months / 360.0) * 6.0;
        let interest_rate = (base_rate + term_bump + normal(rng, 0.0, 1.25)).clamp(6.0, 36.0);

        let denom = annual_income.max(MIN_INCOME_DENOMINATOR);
        let dti = existing_debt / denom;
        let lti = loan_amount / denom;

        let approve_score = 0.008 * (credit_score - 600.0) - 2.2 * dti - 0.9 * lti
            + 0.05 * employment_years
            - 0.03 * (interest_rate - 12.0);
        let officer_decision_approve = u8::from(approve_score > 0.15);

        let z = -1.2 - 0.010 * (credit_score - 700.0) + 3.5 * dti + 1.5 * lti
            + 0.06 * (interest_rate - 12.0)
            - 0.05 * employment_years
            + normal(rng, 0.0, 0.35);
        let p_default = sigmoid(z);
        let actual_default = historical.then(|| u8::from(rng.gen::<f64>() < p_default));

        SyntheticLoan {
            application: LoanApplication {
                annual_income,
                employment_years,
                credit_score,
                existing_debt,
                loan_amount,
                loan_term_months,
                interest_rate,
            },
            officer_decision_approve,
            actual_default,
        }
    }

    /// Random officer from a non-empty id list
    fn assign_officer(&mut self, officer_ids: &[u64]) -> AppResult<u64> {
        officer_ids
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| AppError::invalid_input("no loan officers available"))
    }
}

/// Outcome of seeding a repository
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub customers: usize,
    pub loans: usize,
    pub labeled: usize,
    pub default_rate: f64,
}

/// Fill `repo` with officers, customers and historical loans
pub fn seed_repository(
    repo: &InMemoryLoanRepository,
    generator: &mut SyntheticGenerator,
    customers: usize,
    loans_per_customer: usize,
) -> AppResult<SeedSummary> {
    for officer in generator.officers() {
        repo.add_officer(officer);
    }
    let officer_ids = repo.officer_ids();

    for customer in generator.customers(customers) {
        let customer_id = repo.add_customer(customer);
        for loan in generator.loans(loans_per_customer, true) {
            let officer_id = generator.assign_officer(&officer_ids)?;
            repo.insert_loan(NewLoan {
                customer_id,
                officer_id,
                application: loan.application,
                officer_decision_approve: loan.officer_decision_approve,
                actual_default: loan.actual_default,
            })?;
        }
    }

    let labeled = repo.labeled_loans()?;
    let defaults = labeled.iter().filter(|r| r.actual_default == Some(1)).count();
    let summary = SeedSummary {
        customers: repo.customer_count(),
        loans: repo.loan_count(),
        labeled: labeled.len(),
        default_rate: if labeled.is_empty() {
            0.0
        } else {
            defaults as f64 / labeled.len() as f64
        },
    };
    info!(
        "🌱 Seeded: customers={}, loans={}, labeled={}, default_rate={:.4}",
        summary.customers, summary.loans, summary.labeled, summary.default_rate
    );
    Ok(summary)
}
