//! Default assemblers

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use lendcore_domain::commands::{ChargeSpec, LoanApplicationCommand};
use lendcore_domain::loan::{Loan, LoanCharge, LoanStatus, Money, RepaymentInstallment};
use lendcore_domain::ports::{
    ExternalIdFactory, LoanAssembler, LoanChargeAssembler, LoanScheduleAssembler,
};
use lendcore_domain::{Error, Result};
use uuid::Uuid;

/// Schedule assembler that splits principal evenly across the term
///
/// Interest and amortization strategies are out of scope; the even split
/// keeps downstream schedule handling honest without pretending to be a
/// pricing engine.
#[derive(Debug, Default)]
pub struct EvenSplitScheduleAssembler;

impl EvenSplitScheduleAssembler {
    /// Create the assembler
    pub fn new() -> Self {
        Self
    }
}

impl LoanScheduleAssembler for EvenSplitScheduleAssembler {
    fn assemble_schedule(
        &self,
        principal: &Money,
        term_months: u32,
        first_due_date: NaiveDate,
    ) -> Result<Vec<RepaymentInstallment>> {
        if term_months == 0 {
            return Err(Error::invalid_argument("term must be at least one month"));
        }
        let term = i64::from(term_months);
        let base = principal.amount_minor / term;
        let remainder = principal.amount_minor % term;

        let mut schedule = Vec::with_capacity(term_months as usize);
        for number in 1..=term_months {
            let due_date = first_due_date
                .checked_add_months(Months::new(number - 1))
                .ok_or_else(|| Error::invalid_argument("schedule extends beyond calendar range"))?;
            // The division remainder lands on the first installment.
            let amount = if number == 1 { base + remainder } else { base };
            schedule.push(RepaymentInstallment {
                number,
                due_date,
                principal: Money::new(principal.currency.clone(), amount),
            });
        }
        Ok(schedule)
    }
}

/// Default charge assembler
#[derive(Debug, Default)]
pub struct DefaultLoanChargeAssembler;

impl DefaultLoanChargeAssembler {
    /// Create the assembler
    pub fn new() -> Self {
        Self
    }
}

impl LoanChargeAssembler for DefaultLoanChargeAssembler {
    fn assemble_charges(&self, specs: &[ChargeSpec]) -> Result<Vec<LoanCharge>> {
        Ok(specs
            .iter()
            .map(|spec| LoanCharge {
                id: Uuid::new_v4(),
                name: spec.name.clone(),
                amount: spec.amount.clone(),
                paid: false,
            })
            .collect())
    }
}

/// Default loan assembler
///
/// Composes the schedule and charge assemblers to turn an application
/// command into a loan in submitted state. The first installment falls due
/// one month after submission.
pub struct DefaultLoanAssembler {
    external_ids: Arc<dyn ExternalIdFactory>,
    schedule_assembler: Arc<dyn LoanScheduleAssembler>,
    charge_assembler: Arc<dyn LoanChargeAssembler>,
}

impl DefaultLoanAssembler {
    /// Create the assembler from its collaborators
    pub fn new(
        external_ids: Arc<dyn ExternalIdFactory>,
        schedule_assembler: Arc<dyn LoanScheduleAssembler>,
        charge_assembler: Arc<dyn LoanChargeAssembler>,
    ) -> Self {
        Self {
            external_ids,
            schedule_assembler,
            charge_assembler,
        }
    }
}

#[async_trait]
impl LoanAssembler for DefaultLoanAssembler {
    async fn assemble_from(&self, command: &LoanApplicationCommand) -> Result<Loan> {
        let first_due_date = command
            .submitted_on
            .checked_add_months(Months::new(1))
            .ok_or_else(|| Error::invalid_argument("submission date out of calendar range"))?;
        let schedule = self.schedule_assembler.assemble_schedule(
            &command.principal,
            command.term_months,
            first_due_date,
        )?;
        let charges = self.charge_assembler.assemble_charges(&command.charges)?;

        Ok(Loan {
            id: Uuid::new_v4(),
            external_id: self.external_ids.generate(),
            client: command.client.clone(),
            principal: command.principal.clone(),
            term_months: command.term_months,
            status: LoanStatus::SubmittedAndPendingApproval,
            submitted_on: command.submitted_on,
            approved_on: None,
            disbursed_on: None,
            schedule,
            charges,
            transactions: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UuidExternalIdFactory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn schedule_sums_to_principal() {
        let schedule = EvenSplitScheduleAssembler::new()
            .assemble_schedule(&Money::new("USD", 100_001), 3, date(2025, 2, 1))
            .unwrap();
        assert_eq!(schedule.len(), 3);
        let total: i64 = schedule.iter().map(|i| i.principal.amount_minor).sum();
        assert_eq!(total, 100_001);
        assert_eq!(schedule[0].due_date, date(2025, 2, 1));
        assert_eq!(schedule[2].due_date, date(2025, 4, 1));
    }

    #[test]
    fn zero_term_is_invalid() {
        let err = EvenSplitScheduleAssembler::new()
            .assemble_schedule(&Money::new("USD", 100), 0, date(2025, 2, 1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn assembled_loan_starts_submitted_with_schedule_and_charges() {
        let assembler = DefaultLoanAssembler::new(
            Arc::new(UuidExternalIdFactory::new()),
            Arc::new(EvenSplitScheduleAssembler::new()),
            Arc::new(DefaultLoanChargeAssembler::new()),
        );
        let loan = assembler
            .assemble_from(&LoanApplicationCommand {
                client: "acme".into(),
                principal: Money::new("USD", 120_000),
                term_months: 12,
                submitted_on: date(2025, 1, 15),
                charges: vec![ChargeSpec {
                    name: "origination".into(),
                    amount: Money::new("USD", 1_500),
                }],
            })
            .await
            .unwrap();

        assert_eq!(loan.status, LoanStatus::SubmittedAndPendingApproval);
        assert_eq!(loan.schedule.len(), 12);
        assert_eq!(loan.schedule[0].due_date, date(2025, 2, 15));
        assert_eq!(loan.charges.len(), 1);
        assert!(!loan.charges[0].paid);
    }
}
