//! Mid-level service ports

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::commands::ChargeSpec;
use crate::error::Result;
use crate::events::BusinessEvent;
use crate::loan::{ExternalId, Loan, LoanLifecycleEvent, LoanStatus, LoanTransaction, Money};

/// Produces correlation ids for new records
pub trait ExternalIdFactory: Send + Sync {
    /// Generate a fresh external id
    fn generate(&self) -> ExternalId;
}

/// Decides which lifecycle transitions are legal
///
/// Fails with [`crate::Error::LifecycleTransition`] for anything the loan
/// state does not permit.
pub trait LoanLifecycleStateMachine: Send + Sync {
    /// Apply an event to a status, returning the next status
    fn transition(&self, from: LoanStatus, event: LoanLifecycleEvent) -> Result<LoanStatus>;
}

/// Publishes business events after state changes are persisted
#[async_trait]
pub trait BusinessEventNotifierService: Send + Sync {
    /// Publish an event to whoever is listening
    async fn notify(&self, event: BusinessEvent) -> Result<()>;
}

/// Manages charges on a loan
#[async_trait]
pub trait LoanChargeService: Send + Sync {
    /// Validate and attach a charge
    async fn apply_charge(&self, loan: &mut Loan, spec: ChargeSpec) -> Result<()>;

    /// Mark a charge as paid
    async fn pay_charge(&self, loan: &mut Loan, charge_id: Uuid) -> Result<()>;
}

/// Issues refunds against a loan
#[async_trait]
pub trait LoanRefundService: Send + Sync {
    /// Validate and record a refund, returning the new transaction
    async fn make_refund(
        &self,
        loan: &mut Loan,
        amount: Money,
        on: NaiveDate,
    ) -> Result<LoanTransaction>;
}

/// Keeps the repayment schedule in line with the loan state
#[async_trait]
pub trait LoanScheduleService: Send + Sync {
    /// Rebuild the schedule from the current loan terms
    async fn regenerate_schedule(&self, loan: &mut Loan) -> Result<()>;
}

/// Thin persistence facade over the loan repository
#[async_trait]
pub trait LoanAccountService: Send + Sync {
    /// Persist a loan
    async fn persist(&self, loan: Loan) -> Result<Loan>;

    /// Fetch a loan, failing if it does not exist
    async fn fetch(&self, id: Uuid) -> Result<Loan>;
}

/// Replays a loan's transactions against its schedule
///
/// The replay contract from the transaction-processing layer: operations
/// mutate the loan in place and keep its transactions in value-date order.
#[async_trait]
pub trait ReprocessLoanTransactionsService: Send + Sync {
    /// Replay every transaction on the loan
    async fn reprocess_transactions(&self, loan: &mut Loan) -> Result<()>;

    /// Replace the loan's transactions and replay them
    async fn reprocess_transactions_with(
        &self,
        loan: &mut Loan,
        transactions: Vec<LoanTransaction>,
    ) -> Result<()>;

    /// Replay and then verify balances as of a date
    async fn reprocess_transactions_with_post_transaction_checks(
        &self,
        loan: &mut Loan,
        transaction_date: NaiveDate,
    ) -> Result<()>;

    /// Replay only the transactions recorded after disbursement
    async fn process_post_disbursement_transactions(&self, loan: &mut Loan) -> Result<()>;

    /// Detach a charge and replay the remaining transactions
    async fn remove_loan_charge(&self, loan: &mut Loan, charge_id: Uuid) -> Result<()>;

    /// Apply one new transaction on top of the replayed state
    async fn process_latest_transaction(
        &self,
        transaction: LoanTransaction,
        loan: &mut Loan,
    ) -> Result<()>;
}
