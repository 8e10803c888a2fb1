//! Mid-level loan services
//!
//! Thin orchestration over the validators, assemblers, and the repository.
//! Each service takes only its direct collaborators, keeping factory arity
//! in the catalog bounded.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use lendcore_domain::commands::ChargeSpec;
use lendcore_domain::loan::{Loan, LoanTransaction, Money, TransactionType};
use lendcore_domain::ports::{
    ExternalIdFactory, LoanAccountService, LoanChargeAssembler, LoanChargeService,
    LoanChargeValidator, LoanRefundService, LoanRefundValidator, LoanRepository,
    LoanScheduleAssembler, LoanScheduleService, ReprocessLoanTransactionsService,
};
use lendcore_domain::{Error, Result};
use uuid::Uuid;

/// Default charge management
pub struct DefaultLoanChargeService {
    validator: Arc<dyn LoanChargeValidator>,
    charge_assembler: Arc<dyn LoanChargeAssembler>,
}

impl DefaultLoanChargeService {
    /// Create the service from its collaborators
    pub fn new(
        validator: Arc<dyn LoanChargeValidator>,
        charge_assembler: Arc<dyn LoanChargeAssembler>,
    ) -> Self {
        Self {
            validator,
            charge_assembler,
        }
    }
}

#[async_trait]
impl LoanChargeService for DefaultLoanChargeService {
    async fn apply_charge(&self, loan: &mut Loan, spec: ChargeSpec) -> Result<()> {
        self.validator.validate_charge(loan, &spec)?;
        let charges = self.charge_assembler.assemble_charges(&[spec])?;
        loan.charges.extend(charges);
        Ok(())
    }

    async fn pay_charge(&self, loan: &mut Loan, charge_id: Uuid) -> Result<()> {
        let charge = loan
            .charges
            .iter_mut()
            .find(|charge| charge.id == charge_id)
            .ok_or_else(|| Error::not_found(format!("loan charge {charge_id}")))?;
        if charge.paid {
            return Err(Error::validation(format!(
                "charge '{}' is already paid",
                charge.name
            )));
        }
        charge.paid = true;
        Ok(())
    }
}

/// Default refund handling
pub struct DefaultLoanRefundService {
    validator: Arc<dyn LoanRefundValidator>,
    external_ids: Arc<dyn ExternalIdFactory>,
}

impl DefaultLoanRefundService {
    /// Create the service from its collaborators
    pub fn new(
        validator: Arc<dyn LoanRefundValidator>,
        external_ids: Arc<dyn ExternalIdFactory>,
    ) -> Self {
        Self {
            validator,
            external_ids,
        }
    }
}

#[async_trait]
impl LoanRefundService for DefaultLoanRefundService {
    async fn make_refund(
        &self,
        loan: &mut Loan,
        amount: Money,
        on: NaiveDate,
    ) -> Result<LoanTransaction> {
        self.validator.validate_refund(loan, &amount)?;
        let transaction = LoanTransaction::new(
            self.external_ids.generate(),
            TransactionType::Refund,
            amount,
            on,
        );
        loan.transactions.push(transaction.clone());
        Ok(transaction)
    }
}

/// Default schedule maintenance
pub struct DefaultLoanScheduleService {
    schedule_assembler: Arc<dyn LoanScheduleAssembler>,
    reprocess: Arc<dyn ReprocessLoanTransactionsService>,
}

impl DefaultLoanScheduleService {
    /// Create the service from its collaborators
    pub fn new(
        schedule_assembler: Arc<dyn LoanScheduleAssembler>,
        reprocess: Arc<dyn ReprocessLoanTransactionsService>,
    ) -> Self {
        Self {
            schedule_assembler,
            reprocess,
        }
    }
}

#[async_trait]
impl LoanScheduleService for DefaultLoanScheduleService {
    async fn regenerate_schedule(&self, loan: &mut Loan) -> Result<()> {
        let anchor = loan.disbursed_on.unwrap_or(loan.submitted_on);
        let first_due_date = anchor
            .checked_add_months(Months::new(1))
            .ok_or_else(|| Error::invalid_argument("schedule anchor out of calendar range"))?;
        loan.schedule = self.schedule_assembler.assemble_schedule(
            &loan.principal,
            loan.term_months,
            first_due_date,
        )?;
        self.reprocess.reprocess_transactions(loan).await
    }
}

/// Default persistence facade
pub struct DefaultLoanAccountService {
    repository: Arc<dyn LoanRepository>,
}

impl DefaultLoanAccountService {
    /// Create the facade over a repository
    pub fn new(repository: Arc<dyn LoanRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl LoanAccountService for DefaultLoanAccountService {
    async fn persist(&self, loan: Loan) -> Result<Loan> {
        self.repository.save(loan).await
    }

    async fn fetch(&self, id: Uuid) -> Result<Loan> {
        self.repository.find_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemblers::{DefaultLoanChargeAssembler, EvenSplitScheduleAssembler};
    use crate::events::TokioBroadcastEventNotifier;
    use crate::identity::UuidExternalIdFactory;
    use crate::reprocess::DefaultReprocessLoanTransactionsService;
    use crate::validators::{DefaultLoanChargeValidator, DefaultLoanRefundValidator};
    use lendcore_domain::loan::{ExternalId, LoanStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn active_loan() -> Loan {
        Loan {
            id: Uuid::new_v4(),
            external_id: ExternalId::new("ext"),
            client: "acme".into(),
            principal: Money::new("USD", 60_000),
            term_months: 6,
            status: LoanStatus::Active,
            submitted_on: date(2025, 1, 1),
            approved_on: Some(date(2025, 1, 3)),
            disbursed_on: Some(date(2025, 1, 10)),
            schedule: Vec::new(),
            charges: Vec::new(),
            transactions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn apply_then_pay_charge() {
        let service = DefaultLoanChargeService::new(
            Arc::new(DefaultLoanChargeValidator),
            Arc::new(DefaultLoanChargeAssembler::new()),
        );
        let mut loan = active_loan();
        service
            .apply_charge(
                &mut loan,
                ChargeSpec {
                    name: "late fee".into(),
                    amount: Money::new("USD", 500),
                },
            )
            .await
            .unwrap();
        assert_eq!(loan.charges.len(), 1);

        let charge_id = loan.charges[0].id;
        service.pay_charge(&mut loan, charge_id).await.unwrap();
        assert!(loan.charges[0].paid);

        let err = service.pay_charge(&mut loan, charge_id).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn refund_records_a_transaction() {
        let service = DefaultLoanRefundService::new(
            Arc::new(DefaultLoanRefundValidator),
            Arc::new(UuidExternalIdFactory::new()),
        );
        let mut loan = active_loan();
        loan.transactions.push(LoanTransaction::new(
            ExternalId::new("repay"),
            TransactionType::Repayment,
            Money::new("USD", 10_000),
            date(2025, 2, 10),
        ));

        let tx = service
            .make_refund(&mut loan, Money::new("USD", 2_000), date(2025, 2, 20))
            .await
            .unwrap();
        assert_eq!(tx.kind, TransactionType::Refund);
        assert_eq!(loan.transactions.len(), 2);
    }

    #[tokio::test]
    async fn regenerated_schedule_anchors_on_disbursement() {
        let service = DefaultLoanScheduleService::new(
            Arc::new(EvenSplitScheduleAssembler::new()),
            Arc::new(DefaultReprocessLoanTransactionsService::new(Arc::new(
                TokioBroadcastEventNotifier::new(),
            ))),
        );
        let mut loan = active_loan();
        service.regenerate_schedule(&mut loan).await.unwrap();
        assert_eq!(loan.schedule.len(), 6);
        assert_eq!(loan.schedule[0].due_date, date(2025, 2, 10));
    }
}
