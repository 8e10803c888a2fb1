//! Top-level write-platform facades
//!
//! These are the two capabilities the surrounding request-handling layer
//! consumes. Everything below them is wiring detail.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::commands::LoanApplicationCommand;
use crate::error::Result;
use crate::loan::{Loan, Money};

/// Loan application lifecycle: submit, approve, reject
#[async_trait]
pub trait LoanApplicationWritePlatformService: Send + Sync {
    /// Validate, assemble, and persist a new application
    async fn submit_application(&self, command: LoanApplicationCommand) -> Result<Loan>;

    /// Approve a pending application
    async fn approve_application(&self, loan_id: Uuid, approved_on: NaiveDate) -> Result<Loan>;

    /// Reject a pending application
    async fn reject_application(&self, loan_id: Uuid) -> Result<Loan>;
}

/// Post-approval loan operations: disburse, repay, charge off
#[async_trait]
pub trait LoanWritePlatformService: Send + Sync {
    /// Disburse an approved loan and post the opening journal entries
    async fn disburse(&self, loan_id: Uuid, disbursed_on: NaiveDate) -> Result<Loan>;

    /// Record a repayment and post the resulting journal entries
    async fn make_repayment(&self, loan_id: Uuid, amount: Money, on: NaiveDate) -> Result<Loan>;

    /// Write the outstanding balance off and post both accounting phases
    async fn charge_off(&self, loan_id: Uuid, on: NaiveDate) -> Result<Loan>;
}
