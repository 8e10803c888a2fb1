//! Journal-entry write service and the loan posting adapter
//!
//! The poster derives accounting bridge data from the loan and forwards each
//! batch to the journal-entry write service; charged-off loans hand over one
//! batch per accounting phase. The write service itself only ever sees the
//! pre-computed maps.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use lendcore_domain::loan::{AccountingBridgeData, Loan};
use lendcore_domain::ports::{JournalEntryWritePlatformService, LoanJournalEntryPoster};
use lendcore_domain::{Error, Result};
use tracing::info;
use uuid::Uuid;

/// Journal-entry write service backed by an in-process ledger
///
/// Accounting rule evaluation is out of scope; batches are validated for
/// shape and appended to the ledger so tests and the CLI can inspect what
/// was posted.
#[derive(Debug, Default)]
pub struct InMemoryJournalEntryWriteService {
    ledger: RwLock<Vec<AccountingBridgeData>>,
}

impl InMemoryJournalEntryWriteService {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every batch posted so far
    pub fn posted_batches(&self) -> Vec<AccountingBridgeData> {
        self.ledger
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl JournalEntryWritePlatformService for InMemoryJournalEntryWriteService {
    async fn create_journal_entries_for_loan(
        &self,
        accounting_data: AccountingBridgeData,
    ) -> Result<()> {
        let loan_id = accounting_data
            .get("loan_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::accounting("bridge data is missing loan_id"))?
            .to_owned();
        let transactions = accounting_data
            .get("transactions")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::accounting("bridge data is missing transactions"))?
            .len();

        info!(loan_id, transactions, "posting journal entries");
        self.ledger
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(accounting_data);
        Ok(())
    }
}

/// Default posting adapter
pub struct DefaultLoanJournalEntryPoster {
    journal_entries: Arc<dyn JournalEntryWritePlatformService>,
}

impl DefaultLoanJournalEntryPoster {
    /// Create the poster over a journal-entry write service
    pub fn new(journal_entries: Arc<dyn JournalEntryWritePlatformService>) -> Self {
        Self { journal_entries }
    }
}

#[async_trait]
impl LoanJournalEntryPoster for DefaultLoanJournalEntryPoster {
    async fn post_journal_entries(
        &self,
        loan: &Loan,
        existing_transaction_ids: &[Uuid],
        existing_reversed_transaction_ids: &[Uuid],
    ) -> Result<()> {
        let batches = if loan.is_charged_off() {
            loan.derive_accounting_bridge_data_for_charge_off(
                existing_transaction_ids,
                existing_reversed_transaction_ids,
            )
        } else {
            vec![loan.derive_accounting_bridge_data(
                existing_transaction_ids,
                existing_reversed_transaction_ids,
            )]
        };
        for accounting_data in batches {
            self.journal_entries
                .create_journal_entries_for_loan(accounting_data)
                .await?;
        }
        Ok(())
    }
}
