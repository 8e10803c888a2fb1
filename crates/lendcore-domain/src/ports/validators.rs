//! Validation ports
//!
//! Validators are pure checks invoked by the write-platform services before
//! any state change. Each returns [`crate::Error::Validation`] with a
//! human-readable message on failure.

use crate::commands::{ChargeSpec, LoanApplicationCommand};
use crate::error::Result;
use crate::loan::{Loan, Money};

/// Checks a loan application before submission
pub trait LoanApplicationValidator: Send + Sync {
    /// Validate a submission command
    fn validate_submission(&self, command: &LoanApplicationCommand) -> Result<()>;
}

/// Checks monetary transactions against the loan state
pub trait LoanTransactionValidator: Send + Sync {
    /// Validate a repayment against an active loan
    fn validate_repayment(&self, loan: &Loan, amount: &Money) -> Result<()>;
}

/// Checks that a loan is in a disbursable state
pub trait LoanDisbursementValidator: Send + Sync {
    /// Validate a disbursement
    fn validate_disbursement(&self, loan: &Loan) -> Result<()>;
}

/// Checks charges before they attach to a loan
pub trait LoanChargeValidator: Send + Sync {
    /// Validate a charge against the loan
    fn validate_charge(&self, loan: &Loan, spec: &ChargeSpec) -> Result<()>;
}

/// Checks refunds against the loan state
pub trait LoanRefundValidator: Send + Sync {
    /// Validate a refund amount
    fn validate_refund(&self, loan: &Loan, amount: &Money) -> Result<()>;
}
