//! Loan Repository - Data-Access Boundary
//!
//! The scoring core only needs to fetch loan rows and write predictions
//! back; `LoanRepository` is that seam. `InMemoryLoanRepository` is a
//! thread-safe implementation backed by DashMap (no explicit locking),
//! holding customers and loan officers alongside loans so that the
//! foreign-key checks of a relational store are preserved.

use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    Customer, LoanApplication, LoanOfficer, LoanRecord, NewCustomer, NewLoan, NewOfficer,
};

/// Storage operations consumed by the training and scoring pipelines
pub trait LoanRepository {
    /// Loans with a known outcome, ordered by loan_id
    fn labeled_loans(&self) -> AppResult<Vec<LoanRecord>>;

    /// Loans without a model score, ordered by loan_id
    fn unscored_loans(&self) -> AppResult<Vec<LoanRecord>>;

    /// Single loan by id (`LOAN_NOT_FOUND` if absent)
    fn loan(&self, loan_id: u64) -> AppResult<LoanRecord>;

    /// Store a new loan, returning its id
    fn insert_loan(&self, loan: NewLoan) -> AppResult<u64>;

    /// Write back the model's probability and label
    fn persist_prediction(&self, loan_id: u64, probability: f64, predicted_label: u8) -> AppResult<()>;
}

/// In-memory loan store
#[derive(Clone, Default)]
pub struct InMemoryLoanRepository {
    customers: Arc<DashMap<u64, Customer>>,
    officers: Arc<DashMap<u64, LoanOfficer>>,
    loans: Arc<DashMap<u64, LoanRecord>>,
    next_customer_id: Arc<AtomicU64>,
    next_officer_id: Arc<AtomicU64>,
    next_loan_id: Arc<AtomicU64>,
}

/// Ids start at 1, like SQLite rowids
fn next_id(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_customer(&self, customer: NewCustomer) -> u64 {
        let customer_id = next_id(&self.next_customer_id);
        self.customers.insert(
            customer_id,
            Customer {
                customer_id,
                full_name: customer.full_name,
                age: customer.age,
                gender: customer.gender,
                city: customer.city,
                phone: customer.phone,
            },
        );
        customer_id
    }

    pub fn add_officer(&self, officer: NewOfficer) -> u64 {
        let officer_id = next_id(&self.next_officer_id);
        self.officers.insert(
            officer_id,
            LoanOfficer {
                officer_id,
                full_name: officer.full_name,
                branch_name: officer.branch_name,
                experience_years: officer.experience_years,
            },
        );
        officer_id
    }

    pub fn customer(&self, customer_id: u64) -> Option<Customer> {
        self.customers.get(&customer_id).map(|c| c.value().clone())
    }

    /// Existing customer, or `INPUT_INVALID` naming the missing id
    pub fn require_customer(&self, customer_id: u64) -> AppResult<Customer> {
        self.customer(customer_id)
            .ok_or_else(|| AppError::invalid_input(format!("customer_id {} not found", customer_id)))
    }

    /// Officer ids in ascending order
    pub fn officer_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.officers.iter().map(|o| *o.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Lowest officer id, the default assignee for new applications
    pub fn first_officer_id(&self) -> Option<u64> {
        self.officer_ids().into_iter().next()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }

    /// Insert a loan from a dynamically typed row, validating it at the boundary
    pub fn import_record(
        &self,
        customer_id: u64,
        officer_id: u64,
        record: &Map<String, Value>,
        actual_default: Option<u8>,
    ) -> AppResult<u64> {
        let application = LoanApplication::from_record(record)?;
        let officer_decision_approve = match record.get("officer_decision_approve") {
            Some(Value::Number(n)) => u8::from(n.as_f64().unwrap_or(0.0) != 0.0),
            Some(Value::Bool(b)) => u8::from(*b),
            _ => 0,
        };
        self.insert_loan(NewLoan {
            customer_id,
            officer_id,
            application,
            officer_decision_approve,
            actual_default,
        })
    }

    fn sorted_loans(&self, keep: impl Fn(&LoanRecord) -> bool) -> Vec<LoanRecord> {
        let mut rows: Vec<LoanRecord> = self
            .loans
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|r| r.loan_id);
        rows
    }
}

impl LoanRepository for InMemoryLoanRepository {
    fn labeled_loans(&self) -> AppResult<Vec<LoanRecord>> {
        Ok(self.sorted_loans(LoanRecord::is_labeled))
    }

    fn unscored_loans(&self) -> AppResult<Vec<LoanRecord>> {
        Ok(self.sorted_loans(|r| !r.is_scored()))
    }

    fn loan(&self, loan_id: u64) -> AppResult<LoanRecord> {
        self.loans
            .get(&loan_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::loan_not_found(loan_id))
    }

    fn insert_loan(&self, loan: NewLoan) -> AppResult<u64> {
        if !self.customers.contains_key(&loan.customer_id) {
            return Err(AppError::invalid_input(format!(
                "customer_id {} not found",
                loan.customer_id
            )));
        }
        if !self.officers.contains_key(&loan.officer_id) {
            return Err(AppError::invalid_input(format!(
                "officer_id {} not found",
                loan.officer_id
            )));
        }
        if matches!(loan.actual_default, Some(v) if v > 1) {
            return Err(AppError::invalid_input("actual_default must be 0 or 1"));
        }

        let loan_id = next_id(&self.next_loan_id);
        self.loans.insert(
            loan_id,
            LoanRecord {
                loan_id,
                customer_id: loan.customer_id,
                officer_id: loan.officer_id,
                application: loan.application,
                officer_decision_approve: loan.officer_decision_approve,
                actual_default: loan.actual_default,
                ai_default_prob: None,
                ai_default_pred: None,
            },
        );
        Ok(loan_id)
    }

    fn persist_prediction(&self, loan_id: u64, probability: f64, predicted_label: u8) -> AppResult<()> {
        let mut entry = self
            .loans
            .get_mut(&loan_id)
            .ok_or_else(|| AppError::loan_not_found(loan_id))?;
        entry.ai_default_prob = Some(probability);
        entry.ai_default_pred = Some(predicted_label);
        debug!("📝 loan {} scored p={:.4} pred={}", loan_id, probability, predicted_label);
        Ok(())
    }
}
