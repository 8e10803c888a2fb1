//! Accounting ports
//!
//! The journal-entry write service consumes pre-computed accounting bridge
//! maps; the poster adapts a loan into those maps and forwards them. Keeping
//! the two apart means the accounting side never sees the loan aggregate.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::loan::{AccountingBridgeData, Loan};

/// Posts journal entries from pre-computed bridge data
#[async_trait]
pub trait JournalEntryWritePlatformService: Send + Sync {
    /// Create the journal entries for one posting batch
    async fn create_journal_entries_for_loan(
        &self,
        accounting_data: AccountingBridgeData,
    ) -> Result<()>;
}

/// Derives bridge data from a loan and forwards it to the journal writer
///
/// Charged-off loans produce one batch per accounting phase; everything else
/// produces a single batch.
#[async_trait]
pub trait LoanJournalEntryPoster: Send + Sync {
    /// Post the delta since the given transaction-id snapshots
    async fn post_journal_entries(
        &self,
        loan: &Loan,
        existing_transaction_ids: &[Uuid],
        existing_reversed_transaction_ids: &[Uuid],
    ) -> Result<()>;
}
