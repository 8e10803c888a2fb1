//! Loan lifecycle state machine

use lendcore_domain::loan::{LoanLifecycleEvent, LoanStatus};
use lendcore_domain::ports::LoanLifecycleStateMachine;
use lendcore_domain::{Error, Result};

/// The default transition table
///
/// ```text
/// submitted ──approve──▶ approved ──disburse──▶ active ──repay_in_full──▶ closed
///     │                                           │
///  reject ──▶ rejected                       charge_off ──▶ charged_off
/// ```
#[derive(Debug, Default)]
pub struct DefaultLoanLifecycleStateMachine;

impl DefaultLoanLifecycleStateMachine {
    /// Create the state machine
    pub fn new() -> Self {
        Self
    }
}

impl LoanLifecycleStateMachine for DefaultLoanLifecycleStateMachine {
    fn transition(&self, from: LoanStatus, event: LoanLifecycleEvent) -> Result<LoanStatus> {
        use LoanLifecycleEvent as E;
        use LoanStatus as S;

        match (from, event) {
            (S::SubmittedAndPendingApproval, E::Approve) => Ok(S::Approved),
            (S::SubmittedAndPendingApproval, E::Reject) => Ok(S::Rejected),
            (S::Approved, E::Disburse) => Ok(S::Active),
            (S::Active, E::RepayInFull) => Ok(S::ClosedObligationsMet),
            (S::Active, E::ChargeOff) => Ok(S::ChargedOff),
            (from, event) => Err(Error::LifecycleTransition {
                from: from.to_string(),
                event: event.to_string(),
            }),
        }
    }
}
