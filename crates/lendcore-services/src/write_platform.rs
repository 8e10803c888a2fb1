//! Write-platform facades
//!
//! The two top-level services the request layer consumes. Both persist via
//! the repository, drive the lifecycle state machine, publish business
//! events after the fact, and hand accounting over to the journal poster
//! with id snapshots taken before mutation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use lendcore_domain::commands::LoanApplicationCommand;
use lendcore_domain::events::BusinessEvent;
use lendcore_domain::loan::{Loan, LoanLifecycleEvent, LoanTransaction, Money, TransactionType};
use lendcore_domain::ports::{
    BusinessEventNotifierService, ExternalIdFactory, LoanApplicationValidator,
    LoanApplicationWritePlatformService, LoanAssembler, LoanDisbursementValidator,
    LoanJournalEntryPoster, LoanLifecycleStateMachine, LoanRepository, LoanScheduleService,
    LoanTransactionValidator, LoanWritePlatformService, ReprocessLoanTransactionsService,
};
use lendcore_domain::Result;
use tracing::info;
use uuid::Uuid;

/// Default application lifecycle facade
pub struct LoanApplicationWritePlatformServiceImpl {
    application_validator: Arc<dyn LoanApplicationValidator>,
    loan_assembler: Arc<dyn LoanAssembler>,
    repository: Arc<dyn LoanRepository>,
    lifecycle: Arc<dyn LoanLifecycleStateMachine>,
    notifier: Arc<dyn BusinessEventNotifierService>,
}

impl LoanApplicationWritePlatformServiceImpl {
    /// Create the facade from its collaborators
    pub fn new(
        application_validator: Arc<dyn LoanApplicationValidator>,
        loan_assembler: Arc<dyn LoanAssembler>,
        repository: Arc<dyn LoanRepository>,
        lifecycle: Arc<dyn LoanLifecycleStateMachine>,
        notifier: Arc<dyn BusinessEventNotifierService>,
    ) -> Self {
        Self {
            application_validator,
            loan_assembler,
            repository,
            lifecycle,
            notifier,
        }
    }
}

#[async_trait]
impl LoanApplicationWritePlatformService for LoanApplicationWritePlatformServiceImpl {
    async fn submit_application(&self, command: LoanApplicationCommand) -> Result<Loan> {
        self.application_validator.validate_submission(&command)?;
        let loan = self.loan_assembler.assemble_from(&command).await?;
        let saved = self.repository.save(loan).await?;
        info!(loan_id = %saved.id, client = %saved.client, "loan application submitted");
        self.notifier
            .notify(BusinessEvent::LoanApplicationSubmitted { loan_id: saved.id })
            .await?;
        Ok(saved)
    }

    async fn approve_application(&self, loan_id: Uuid, approved_on: NaiveDate) -> Result<Loan> {
        let mut loan = self.repository.find_by_id(loan_id).await?;
        loan.status = self
            .lifecycle
            .transition(loan.status, LoanLifecycleEvent::Approve)?;
        loan.approved_on = Some(approved_on);
        let saved = self.repository.save(loan).await?;
        self.notifier
            .notify(BusinessEvent::LoanApproved {
                loan_id,
                approved_on,
            })
            .await?;
        Ok(saved)
    }

    async fn reject_application(&self, loan_id: Uuid) -> Result<Loan> {
        let mut loan = self.repository.find_by_id(loan_id).await?;
        loan.status = self
            .lifecycle
            .transition(loan.status, LoanLifecycleEvent::Reject)?;
        let saved = self.repository.save(loan).await?;
        self.notifier
            .notify(BusinessEvent::LoanRejected { loan_id })
            .await?;
        Ok(saved)
    }
}

/// Default post-approval facade
pub struct LoanWritePlatformServiceImpl {
    transaction_validator: Arc<dyn LoanTransactionValidator>,
    disbursement_validator: Arc<dyn LoanDisbursementValidator>,
    repository: Arc<dyn LoanRepository>,
    lifecycle: Arc<dyn LoanLifecycleStateMachine>,
    notifier: Arc<dyn BusinessEventNotifierService>,
    external_ids: Arc<dyn ExternalIdFactory>,
    journal_entry_poster: Arc<dyn LoanJournalEntryPoster>,
    reprocess: Arc<dyn ReprocessLoanTransactionsService>,
    schedule_service: Arc<dyn LoanScheduleService>,
}

impl LoanWritePlatformServiceImpl {
    /// Create the facade from its collaborators
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_validator: Arc<dyn LoanTransactionValidator>,
        disbursement_validator: Arc<dyn LoanDisbursementValidator>,
        repository: Arc<dyn LoanRepository>,
        lifecycle: Arc<dyn LoanLifecycleStateMachine>,
        notifier: Arc<dyn BusinessEventNotifierService>,
        external_ids: Arc<dyn ExternalIdFactory>,
        journal_entry_poster: Arc<dyn LoanJournalEntryPoster>,
        reprocess: Arc<dyn ReprocessLoanTransactionsService>,
        schedule_service: Arc<dyn LoanScheduleService>,
    ) -> Self {
        Self {
            transaction_validator,
            disbursement_validator,
            repository,
            lifecycle,
            notifier,
            external_ids,
            journal_entry_poster,
            reprocess,
            schedule_service,
        }
    }
}

#[async_trait]
impl LoanWritePlatformService for LoanWritePlatformServiceImpl {
    async fn disburse(&self, loan_id: Uuid, disbursed_on: NaiveDate) -> Result<Loan> {
        let mut loan = self.repository.find_by_id(loan_id).await?;
        self.disbursement_validator.validate_disbursement(&loan)?;
        let next = self
            .lifecycle
            .transition(loan.status, LoanLifecycleEvent::Disburse)?;

        let existing = loan.transaction_ids();
        let existing_reversed = loan.reversed_transaction_ids();

        loan.status = next;
        loan.disbursed_on = Some(disbursed_on);
        loan.transactions.push(LoanTransaction::new(
            self.external_ids.generate(),
            TransactionType::Disbursement,
            loan.principal.clone(),
            disbursed_on,
        ));
        self.schedule_service.regenerate_schedule(&mut loan).await?;

        self.journal_entry_poster
            .post_journal_entries(&loan, &existing, &existing_reversed)
            .await?;
        let saved = self.repository.save(loan).await?;
        info!(loan_id = %loan_id, %disbursed_on, "loan disbursed");
        self.notifier
            .notify(BusinessEvent::LoanDisbursed {
                loan_id,
                disbursed_on,
            })
            .await?;
        Ok(saved)
    }

    async fn make_repayment(&self, loan_id: Uuid, amount: Money, on: NaiveDate) -> Result<Loan> {
        let mut loan = self.repository.find_by_id(loan_id).await?;
        self.transaction_validator
            .validate_repayment(&loan, &amount)?;

        let existing = loan.transaction_ids();
        let existing_reversed = loan.reversed_transaction_ids();
        let amount_minor = amount.amount_minor;

        let transaction = LoanTransaction::new(
            self.external_ids.generate(),
            TransactionType::Repayment,
            amount,
            on,
        );
        self.reprocess
            .process_latest_transaction(transaction, &mut loan)
            .await?;
        if loan.outstanding_principal() == 0 {
            loan.status = self
                .lifecycle
                .transition(loan.status, LoanLifecycleEvent::RepayInFull)?;
        }

        self.journal_entry_poster
            .post_journal_entries(&loan, &existing, &existing_reversed)
            .await?;
        let saved = self.repository.save(loan).await?;
        self.notifier
            .notify(BusinessEvent::LoanRepaymentMade {
                loan_id,
                amount_minor,
            })
            .await?;
        Ok(saved)
    }

    async fn charge_off(&self, loan_id: Uuid, on: NaiveDate) -> Result<Loan> {
        let mut loan = self.repository.find_by_id(loan_id).await?;
        let next = self
            .lifecycle
            .transition(loan.status, LoanLifecycleEvent::ChargeOff)?;

        let existing = loan.transaction_ids();
        let existing_reversed = loan.reversed_transaction_ids();

        let outstanding = loan.outstanding_principal();
        loan.transactions.push(LoanTransaction::new(
            self.external_ids.generate(),
            TransactionType::ChargeOff,
            Money::new(loan.currency().to_owned(), outstanding),
            on,
        ));
        // Status flips before posting so the poster takes the two-phase path.
        loan.status = next;

        self.journal_entry_poster
            .post_journal_entries(&loan, &existing, &existing_reversed)
            .await?;
        let saved = self.repository.save(loan).await?;
        info!(loan_id = %loan_id, outstanding, "loan charged off");
        self.notifier
            .notify(BusinessEvent::LoanChargedOff { loan_id })
            .await?;
        Ok(saved)
    }
}
