//! Business events emitted by the write-platform services
//!
//! Events are fire-and-forget notifications published through the
//! business-event notifier port after a state change has been persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Loan lifecycle notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BusinessEvent {
    /// A loan application was submitted
    LoanApplicationSubmitted {
        /// The new loan
        loan_id: Uuid,
    },
    /// A pending application was approved
    LoanApproved {
        /// The approved loan
        loan_id: Uuid,
        /// Approval date
        approved_on: NaiveDate,
    },
    /// A pending application was rejected
    LoanRejected {
        /// The rejected loan
        loan_id: Uuid,
    },
    /// An approved loan was disbursed
    LoanDisbursed {
        /// The disbursed loan
        loan_id: Uuid,
        /// Disbursement date
        disbursed_on: NaiveDate,
    },
    /// A repayment was recorded
    LoanRepaymentMade {
        /// The loan repaid against
        loan_id: Uuid,
        /// Amount received, in minor units
        amount_minor: i64,
    },
    /// A loan was written off
    LoanChargedOff {
        /// The written-off loan
        loan_id: Uuid,
    },
    /// Transactions were replayed against a loan
    LoanTransactionsReplayed {
        /// The reprocessed loan
        loan_id: Uuid,
        /// Number of transactions replayed
        count: usize,
    },
}

impl BusinessEvent {
    /// The loan the event refers to
    pub fn loan_id(&self) -> Uuid {
        match self {
            Self::LoanApplicationSubmitted { loan_id }
            | Self::LoanApproved { loan_id, .. }
            | Self::LoanRejected { loan_id }
            | Self::LoanDisbursed { loan_id, .. }
            | Self::LoanRepaymentMade { loan_id, .. }
            | Self::LoanChargedOff { loan_id }
            | Self::LoanTransactionsReplayed { loan_id, .. } => *loan_id,
        }
    }
}
