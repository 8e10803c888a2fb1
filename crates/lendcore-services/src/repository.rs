//! In-memory loan repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use lendcore_domain::loan::Loan;
use lendcore_domain::ports::LoanRepository;
use lendcore_domain::{Error, Result};
use uuid::Uuid;

/// Loan store backed by a process-local map
///
/// Persistence schema is out of scope for the platform core; this default
/// keeps the wired graph functional and is swapped out by hosts that supply
/// their own repository capability.
#[derive(Debug, Default)]
pub struct InMemoryLoanRepository {
    loans: RwLock<HashMap<Uuid, Loan>>,
}

impl InMemoryLoanRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Loan>> {
        self.loans.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Loan>> {
        self.loans.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LoanRepository for InMemoryLoanRepository {
    async fn save(&self, loan: Loan) -> Result<Loan> {
        self.write().insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Loan> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("loan {id}")))
    }

    async fn find_all(&self) -> Result<Vec<Loan>> {
        Ok(self.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lendcore_domain::loan::{ExternalId, LoanStatus, Money};

    fn loan() -> Loan {
        Loan {
            id: Uuid::new_v4(),
            external_id: ExternalId::new("ext"),
            client: "acme".into(),
            principal: Money::new("USD", 50_000),
            term_months: 6,
            status: LoanStatus::SubmittedAndPendingApproval,
            submitted_on: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            approved_on: None,
            disbursed_on: None,
            schedule: Vec::new(),
            charges: Vec::new(),
            transactions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let repo = InMemoryLoanRepository::new();
        let saved = repo.save(loan()).await.unwrap();
        let found = repo.find_by_id(saved.id).await.unwrap();
        assert_eq!(found.client, "acme");
    }

    #[tokio::test]
    async fn missing_loan_is_not_found() {
        let repo = InMemoryLoanRepository::new();
        let err = repo.find_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
