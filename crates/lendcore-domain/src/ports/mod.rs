//! Capability ports
//!
//! Every interface the composition root can produce an instance of. Ports
//! are consumed as `Arc<dyn Trait>` and constructed by factories registered
//! with the service registry; implementations live in `lendcore-services`.

pub mod accounting;
pub mod assemblers;
pub mod repositories;
pub mod services;
pub mod validators;
pub mod write_platform;

pub use accounting::{JournalEntryWritePlatformService, LoanJournalEntryPoster};
pub use assemblers::{LoanAssembler, LoanChargeAssembler, LoanScheduleAssembler};
pub use repositories::LoanRepository;
pub use services::{
    BusinessEventNotifierService, ExternalIdFactory, LoanAccountService, LoanChargeService,
    LoanLifecycleStateMachine, LoanRefundService, LoanScheduleService,
    ReprocessLoanTransactionsService,
};
pub use validators::{
    LoanApplicationValidator, LoanChargeValidator, LoanDisbursementValidator, LoanRefundValidator,
    LoanTransactionValidator,
};
pub use write_platform::{LoanApplicationWritePlatformService, LoanWritePlatformService};
