//! Capability catalog
//!
//! The single place that names every loan-account capability and registers
//! its default recipe. Registration order follows the dependency layering
//! (platform services first, facades last) so `build_all` constructs the
//! graph without surprises, though resolution would also discover the order
//! on its own.
//!
//! Hosts that want to replace a default call
//! [`ServiceRegistry::supply_external`] for the capability before anything
//! resolves; the recipe registered here then stays dormant.

use std::sync::Arc;

use lendcore_domain::ports::{
    BusinessEventNotifierService, ExternalIdFactory, JournalEntryWritePlatformService,
    LoanAccountService, LoanApplicationValidator, LoanApplicationWritePlatformService,
    LoanAssembler, LoanChargeAssembler, LoanChargeService, LoanChargeValidator,
    LoanDisbursementValidator, LoanJournalEntryPoster, LoanLifecycleStateMachine,
    LoanRefundService, LoanRefundValidator, LoanRepository, LoanScheduleAssembler,
    LoanScheduleService, LoanTransactionValidator, LoanWritePlatformService,
    ReprocessLoanTransactionsService,
};
use lendcore_registry::{Capability, Result, ServiceRegistry};
use tracing::debug;

use crate::accounting::{DefaultLoanJournalEntryPoster, InMemoryJournalEntryWriteService};
use crate::assemblers::{
    DefaultLoanAssembler, DefaultLoanChargeAssembler, EvenSplitScheduleAssembler,
};
use crate::events::TokioBroadcastEventNotifier;
use crate::identity::UuidExternalIdFactory;
use crate::lifecycle::DefaultLoanLifecycleStateMachine;
use crate::loan_services::{
    DefaultLoanAccountService, DefaultLoanChargeService, DefaultLoanRefundService,
    DefaultLoanScheduleService,
};
use crate::repository::InMemoryLoanRepository;
use crate::reprocess::DefaultReprocessLoanTransactionsService;
use crate::validators::{
    DefaultLoanApplicationValidator, DefaultLoanChargeValidator, DefaultLoanDisbursementValidator,
    DefaultLoanRefundValidator, DefaultLoanTransactionValidator,
};
use crate::write_platform::{LoanApplicationWritePlatformServiceImpl, LoanWritePlatformServiceImpl};

// Platform capabilities
pub const EXTERNAL_ID_FACTORY: Capability<dyn ExternalIdFactory> =
    Capability::new("platform.external_id_factory");
pub const BUSINESS_EVENT_NOTIFIER: Capability<dyn BusinessEventNotifierService> =
    Capability::new("platform.business_event_notifier");

// Loan capabilities
pub const LOAN_LIFECYCLE_STATE_MACHINE: Capability<dyn LoanLifecycleStateMachine> =
    Capability::new("loan.lifecycle_state_machine");
pub const LOAN_REPOSITORY: Capability<dyn LoanRepository> = Capability::new("loan.repository");
pub const LOAN_APPLICATION_VALIDATOR: Capability<dyn LoanApplicationValidator> =
    Capability::new("loan.application_validator");
pub const LOAN_TRANSACTION_VALIDATOR: Capability<dyn LoanTransactionValidator> =
    Capability::new("loan.transaction_validator");
pub const LOAN_DISBURSEMENT_VALIDATOR: Capability<dyn LoanDisbursementValidator> =
    Capability::new("loan.disbursement_validator");
pub const LOAN_CHARGE_VALIDATOR: Capability<dyn LoanChargeValidator> =
    Capability::new("loan.charge_validator");
pub const LOAN_REFUND_VALIDATOR: Capability<dyn LoanRefundValidator> =
    Capability::new("loan.refund_validator");
pub const LOAN_SCHEDULE_ASSEMBLER: Capability<dyn LoanScheduleAssembler> =
    Capability::new("loan.schedule_assembler");
pub const LOAN_CHARGE_ASSEMBLER: Capability<dyn LoanChargeAssembler> =
    Capability::new("loan.charge_assembler");
pub const LOAN_ASSEMBLER: Capability<dyn LoanAssembler> = Capability::new("loan.assembler");
pub const LOAN_CHARGE_SERVICE: Capability<dyn LoanChargeService> =
    Capability::new("loan.charge_service");
pub const LOAN_REFUND_SERVICE: Capability<dyn LoanRefundService> =
    Capability::new("loan.refund_service");
pub const LOAN_SCHEDULE_SERVICE: Capability<dyn LoanScheduleService> =
    Capability::new("loan.schedule_service");
pub const LOAN_ACCOUNT_SERVICE: Capability<dyn LoanAccountService> =
    Capability::new("loan.account_service");
pub const REPROCESS_LOAN_TRANSACTIONS_SERVICE: Capability<dyn ReprocessLoanTransactionsService> =
    Capability::new("loan.reprocess_transactions_service");
pub const LOAN_APPLICATION_WRITE_PLATFORM_SERVICE: Capability<
    dyn LoanApplicationWritePlatformService,
> = Capability::new("loan.application_write_platform_service");
pub const LOAN_WRITE_PLATFORM_SERVICE: Capability<dyn LoanWritePlatformService> =
    Capability::new("loan.write_platform_service");

// Accounting capabilities
pub const JOURNAL_ENTRY_WRITE_SERVICE: Capability<dyn JournalEntryWritePlatformService> =
    Capability::new("accounting.journal_entry_write_service");
pub const LOAN_JOURNAL_ENTRY_POSTER: Capability<dyn LoanJournalEntryPoster> =
    Capability::new("accounting.loan_journal_entry_poster");

/// Register the default recipe for every loan-account capability.
///
/// Call this once on a fresh registry, after any `supply_external`
/// overrides, then `build_all` (or resolve lazily). Calling it twice fails
/// with a duplicate-registration error on the first capability.
pub fn register_loan_account_defaults(registry: &ServiceRegistry) -> Result<()> {
    // Leaf capabilities with no dependencies of their own.
    registry.register(EXTERNAL_ID_FACTORY, |_| {
        Ok(Arc::new(UuidExternalIdFactory::new()))
    })?;
    registry.register(BUSINESS_EVENT_NOTIFIER, |_| {
        Ok(Arc::new(TokioBroadcastEventNotifier::new()))
    })?;
    registry.register(LOAN_LIFECYCLE_STATE_MACHINE, |_| {
        Ok(Arc::new(DefaultLoanLifecycleStateMachine::new()))
    })?;
    registry.register(LOAN_REPOSITORY, |_| {
        Ok(Arc::new(InMemoryLoanRepository::new()))
    })?;
    registry.register(JOURNAL_ENTRY_WRITE_SERVICE, |_| {
        Ok(Arc::new(InMemoryJournalEntryWriteService::new()))
    })?;

    registry.register(LOAN_APPLICATION_VALIDATOR, |_| {
        Ok(Arc::new(DefaultLoanApplicationValidator))
    })?;
    registry.register(LOAN_TRANSACTION_VALIDATOR, |_| {
        Ok(Arc::new(DefaultLoanTransactionValidator))
    })?;
    registry.register(LOAN_DISBURSEMENT_VALIDATOR, |_| {
        Ok(Arc::new(DefaultLoanDisbursementValidator))
    })?;
    registry.register(LOAN_CHARGE_VALIDATOR, |_| {
        Ok(Arc::new(DefaultLoanChargeValidator))
    })?;
    registry.register(LOAN_REFUND_VALIDATOR, |_| {
        Ok(Arc::new(DefaultLoanRefundValidator))
    })?;

    registry.register(LOAN_SCHEDULE_ASSEMBLER, |_| {
        Ok(Arc::new(EvenSplitScheduleAssembler::new()))
    })?;
    registry.register(LOAN_CHARGE_ASSEMBLER, |_| {
        Ok(Arc::new(DefaultLoanChargeAssembler::new()))
    })?;
    registry.register(LOAN_ASSEMBLER, |r| {
        Ok(Arc::new(DefaultLoanAssembler::new(
            r.resolve(EXTERNAL_ID_FACTORY)?,
            r.resolve(LOAN_SCHEDULE_ASSEMBLER)?,
            r.resolve(LOAN_CHARGE_ASSEMBLER)?,
        )))
    })?;

    registry.register(REPROCESS_LOAN_TRANSACTIONS_SERVICE, |r| {
        Ok(Arc::new(DefaultReprocessLoanTransactionsService::new(
            r.resolve(BUSINESS_EVENT_NOTIFIER)?,
        )))
    })?;
    registry.register(LOAN_JOURNAL_ENTRY_POSTER, |r| {
        Ok(Arc::new(DefaultLoanJournalEntryPoster::new(
            r.resolve(JOURNAL_ENTRY_WRITE_SERVICE)?,
        )))
    })?;

    registry.register(LOAN_CHARGE_SERVICE, |r| {
        Ok(Arc::new(DefaultLoanChargeService::new(
            r.resolve(LOAN_CHARGE_VALIDATOR)?,
            r.resolve(LOAN_CHARGE_ASSEMBLER)?,
        )))
    })?;
    registry.register(LOAN_REFUND_SERVICE, |r| {
        Ok(Arc::new(DefaultLoanRefundService::new(
            r.resolve(LOAN_REFUND_VALIDATOR)?,
            r.resolve(EXTERNAL_ID_FACTORY)?,
        )))
    })?;
    registry.register(LOAN_SCHEDULE_SERVICE, |r| {
        Ok(Arc::new(DefaultLoanScheduleService::new(
            r.resolve(LOAN_SCHEDULE_ASSEMBLER)?,
            r.resolve(REPROCESS_LOAN_TRANSACTIONS_SERVICE)?,
        )))
    })?;
    registry.register(LOAN_ACCOUNT_SERVICE, |r| {
        Ok(Arc::new(DefaultLoanAccountService::new(
            r.resolve(LOAN_REPOSITORY)?,
        )))
    })?;

    registry.register(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE, |r| {
        Ok(Arc::new(LoanApplicationWritePlatformServiceImpl::new(
            r.resolve(LOAN_APPLICATION_VALIDATOR)?,
            r.resolve(LOAN_ASSEMBLER)?,
            r.resolve(LOAN_REPOSITORY)?,
            r.resolve(LOAN_LIFECYCLE_STATE_MACHINE)?,
            r.resolve(BUSINESS_EVENT_NOTIFIER)?,
        )))
    })?;
    registry.register(LOAN_WRITE_PLATFORM_SERVICE, |r| {
        Ok(Arc::new(LoanWritePlatformServiceImpl::new(
            r.resolve(LOAN_TRANSACTION_VALIDATOR)?,
            r.resolve(LOAN_DISBURSEMENT_VALIDATOR)?,
            r.resolve(LOAN_REPOSITORY)?,
            r.resolve(LOAN_LIFECYCLE_STATE_MACHINE)?,
            r.resolve(BUSINESS_EVENT_NOTIFIER)?,
            r.resolve(EXTERNAL_ID_FACTORY)?,
            r.resolve(LOAN_JOURNAL_ENTRY_POSTER)?,
            r.resolve(REPROCESS_LOAN_TRANSACTIONS_SERVICE)?,
            r.resolve(LOAN_SCHEDULE_SERVICE)?,
        )))
    })?;

    debug!(
        capabilities = registry.capability_names().len(),
        "registered loan-account defaults"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_register_and_build() {
        let registry = ServiceRegistry::new();
        register_loan_account_defaults(&registry).unwrap();
        registry.build_all().unwrap();
        assert!(registry.is_resolved(LOAN_WRITE_PLATFORM_SERVICE.name()));
    }

    #[test]
    fn registering_twice_is_a_duplicate() {
        let registry = ServiceRegistry::new();
        register_loan_account_defaults(&registry).unwrap();
        assert!(register_loan_account_defaults(&registry).is_err());
    }

    #[test]
    fn facades_resolve_as_singletons() {
        let registry = ServiceRegistry::new();
        register_loan_account_defaults(&registry).unwrap();
        let a = registry
            .resolve(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
            .unwrap();
        let b = registry
            .resolve(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
