//! Commands accepted by the write-platform facades

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::loan::Money;

/// A fee to attach to a loan at submission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeSpec {
    /// Human-readable charge name
    pub name: String,
    /// Charge amount
    pub amount: Money,
}

/// Request to open a new loan account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplicationCommand {
    /// Client applying for the loan
    pub client: String,
    /// Requested principal
    pub principal: Money,
    /// Repayment term in months
    pub term_months: u32,
    /// Submission date
    pub submitted_on: NaiveDate,
    /// Fees to attach at submission
    pub charges: Vec<ChargeSpec>,
}
