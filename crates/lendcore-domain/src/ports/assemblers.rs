//! Assembler ports
//!
//! Assemblers turn inbound commands into domain objects. The loan assembler
//! composes the schedule and charge assemblers, mirroring how the write
//! services are stacked on top of it.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::commands::{ChargeSpec, LoanApplicationCommand};
use crate::error::Result;
use crate::loan::{Loan, LoanCharge, Money, RepaymentInstallment};

/// Builds a repayment schedule for a principal and term
///
/// Amortization strategy is an implementation detail of the provider; the
/// default in `lendcore-services` is a plain even principal split.
pub trait LoanScheduleAssembler: Send + Sync {
    /// Build the installment list
    fn assemble_schedule(
        &self,
        principal: &Money,
        term_months: u32,
        first_due_date: NaiveDate,
    ) -> Result<Vec<RepaymentInstallment>>;
}

/// Materializes charge specifications into loan charges
pub trait LoanChargeAssembler: Send + Sync {
    /// Build charges from their specs
    fn assemble_charges(&self, specs: &[ChargeSpec]) -> Result<Vec<LoanCharge>>;
}

/// Builds a full loan aggregate from an application command
#[async_trait]
pub trait LoanAssembler: Send + Sync {
    /// Assemble a new loan in submitted state
    async fn assemble_from(&self, command: &LoanApplicationCommand) -> Result<Loan>;
}
