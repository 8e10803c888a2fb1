//! End-to-end wiring tests: the full default catalog driving a loan through
//! its lifecycle, plus host overrides pre-empting catalog defaults.

use std::sync::{Arc, Mutex};

use lendcore_domain::commands::{ChargeSpec, LoanApplicationCommand};
use lendcore_domain::events::BusinessEvent;
use lendcore_domain::loan::{AccountingBridgeData, LoanStatus, Money};
use lendcore_domain::ports::JournalEntryWritePlatformService;
use lendcore_domain::Error;
use lendcore_registry::{BindingSource, ServiceRegistry};
use lendcore_services::accounting::InMemoryJournalEntryWriteService;
use lendcore_services::catalog::{
    self, BUSINESS_EVENT_NOTIFIER, JOURNAL_ENTRY_WRITE_SERVICE,
    LOAN_APPLICATION_WRITE_PLATFORM_SERVICE, LOAN_WRITE_PLATFORM_SERVICE,
};
use lendcore_services::events::TokioBroadcastEventNotifier;

use async_trait::async_trait;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn application() -> LoanApplicationCommand {
    LoanApplicationCommand {
        client: "acme".into(),
        principal: Money::new("USD", 120_000),
        term_months: 12,
        submitted_on: date(2025, 1, 15),
        charges: vec![ChargeSpec {
            name: "origination".into(),
            amount: Money::new("USD", 1_500),
        }],
    }
}

#[tokio::test]
async fn full_lifecycle_through_the_default_catalog() {
    let registry = ServiceRegistry::new();
    let journal = Arc::new(InMemoryJournalEntryWriteService::new());
    registry
        .supply_external(
            JOURNAL_ENTRY_WRITE_SERVICE,
            journal.clone() as Arc<dyn JournalEntryWritePlatformService>,
        )
        .unwrap();
    catalog::register_loan_account_defaults(&registry).unwrap();
    registry.build_all().unwrap();

    let applications = registry
        .resolve(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
        .unwrap();
    let loans = registry.resolve(LOAN_WRITE_PLATFORM_SERVICE).unwrap();

    let loan = applications.submit_application(application()).await.unwrap();
    assert_eq!(loan.status, LoanStatus::SubmittedAndPendingApproval);
    assert_eq!(loan.schedule.len(), 12);
    assert_eq!(loan.charges.len(), 1);

    let loan = applications
        .approve_application(loan.id, date(2025, 1, 20))
        .await
        .unwrap();
    assert_eq!(loan.status, LoanStatus::Approved);

    let loan = loans.disburse(loan.id, date(2025, 2, 1)).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.transactions.len(), 1);
    // Schedule re-anchors on the disbursement date.
    assert_eq!(loan.schedule[0].due_date, date(2025, 3, 1));
    assert_eq!(journal.posted_batches().len(), 1);

    let loan = loans
        .make_repayment(loan.id, Money::new("USD", 20_000), date(2025, 3, 1))
        .await
        .unwrap();
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.outstanding_principal(), 100_000);

    let loan = loans
        .make_repayment(loan.id, Money::new("USD", 100_000), date(2025, 4, 1))
        .await
        .unwrap();
    assert_eq!(loan.status, LoanStatus::ClosedObligationsMet);
    assert_eq!(loan.outstanding_principal(), 0);
    assert_eq!(journal.posted_batches().len(), 3);
}

#[tokio::test]
async fn charge_off_posts_both_accounting_phases() {
    let registry = ServiceRegistry::new();
    let journal = Arc::new(InMemoryJournalEntryWriteService::new());
    registry
        .supply_external(
            JOURNAL_ENTRY_WRITE_SERVICE,
            journal.clone() as Arc<dyn JournalEntryWritePlatformService>,
        )
        .unwrap();
    catalog::register_loan_account_defaults(&registry).unwrap();
    registry.build_all().unwrap();

    let applications = registry
        .resolve(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
        .unwrap();
    let loans = registry.resolve(LOAN_WRITE_PLATFORM_SERVICE).unwrap();

    let loan = applications.submit_application(application()).await.unwrap();
    let loan = applications
        .approve_application(loan.id, date(2025, 1, 20))
        .await
        .unwrap();
    let loan = loans.disburse(loan.id, date(2025, 2, 1)).await.unwrap();
    let loan = loans
        .make_repayment(loan.id, Money::new("USD", 20_000), date(2025, 3, 1))
        .await
        .unwrap();

    let posted_before = journal.posted_batches().len();
    let loan = loans.charge_off(loan.id, date(2025, 6, 1)).await.unwrap();
    assert_eq!(loan.status, LoanStatus::ChargedOff);
    // One batch per accounting phase around the charge-off date.
    assert_eq!(journal.posted_batches().len(), posted_before + 2);
}

#[tokio::test]
async fn lifecycle_violations_are_rejected() {
    let registry = ServiceRegistry::new();
    catalog::register_loan_account_defaults(&registry).unwrap();

    let applications = registry
        .resolve(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
        .unwrap();
    let loans = registry.resolve(LOAN_WRITE_PLATFORM_SERVICE).unwrap();

    let loan = applications.submit_application(application()).await.unwrap();

    // Disbursing before approval fails in validation.
    let err = loans
        .disburse(loan.id, date(2025, 2, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    // Approving twice fails in the state machine.
    applications
        .approve_application(loan.id, date(2025, 1, 20))
        .await
        .unwrap();
    let err = applications
        .approve_application(loan.id, date(2025, 1, 21))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LifecycleTransition { .. }));
}

#[tokio::test]
async fn business_events_reach_an_external_notifier() {
    let registry = ServiceRegistry::new();
    let notifier = Arc::new(TokioBroadcastEventNotifier::new());
    let mut events = notifier.subscribe();
    registry
        .supply_external(BUSINESS_EVENT_NOTIFIER, notifier.clone() as Arc<_>)
        .unwrap();
    catalog::register_loan_account_defaults(&registry).unwrap();

    let applications = registry
        .resolve(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
        .unwrap();
    let loan = applications.submit_application(application()).await.unwrap();

    match events.recv().await.unwrap() {
        BusinessEvent::LoanApplicationSubmitted { loan_id } => assert_eq!(loan_id, loan.id),
        other => panic!("unexpected event {other:?}"),
    }

    let report = registry.report();
    let entry = report
        .iter()
        .find(|c| c.name == BUSINESS_EVENT_NOTIFIER.name())
        .unwrap();
    assert_eq!(entry.source, BindingSource::External);
}

struct FailingJournal;

#[async_trait]
impl JournalEntryWritePlatformService for FailingJournal {
    async fn create_journal_entries_for_loan(&self, _data: AccountingBridgeData) -> Result<(), Error> {
        Err(Error::accounting("ledger unavailable"))
    }
}

#[tokio::test]
async fn accounting_failures_propagate_out_of_disbursement() {
    let registry = ServiceRegistry::new();
    registry
        .supply_external(
            JOURNAL_ENTRY_WRITE_SERVICE,
            Arc::new(FailingJournal) as Arc<dyn JournalEntryWritePlatformService>,
        )
        .unwrap();
    catalog::register_loan_account_defaults(&registry).unwrap();

    let applications = registry
        .resolve(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
        .unwrap();
    let loans = registry.resolve(LOAN_WRITE_PLATFORM_SERVICE).unwrap();

    let loan = applications.submit_application(application()).await.unwrap();
    applications
        .approve_application(loan.id, date(2025, 1, 20))
        .await
        .unwrap();

    let err = loans
        .disburse(loan.id, date(2025, 2, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Accounting { .. }));
}

struct RecordingJournal {
    batches: Mutex<Vec<AccountingBridgeData>>,
}

#[async_trait]
impl JournalEntryWritePlatformService for RecordingJournal {
    async fn create_journal_entries_for_loan(&self, data: AccountingBridgeData) -> Result<(), Error> {
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(data);
        Ok(())
    }
}

#[tokio::test]
async fn bridge_data_carries_only_new_transactions() {
    let registry = ServiceRegistry::new();
    let journal = Arc::new(RecordingJournal {
        batches: Mutex::new(Vec::new()),
    });
    registry
        .supply_external(
            JOURNAL_ENTRY_WRITE_SERVICE,
            journal.clone() as Arc<dyn JournalEntryWritePlatformService>,
        )
        .unwrap();
    catalog::register_loan_account_defaults(&registry).unwrap();

    let applications = registry
        .resolve(LOAN_APPLICATION_WRITE_PLATFORM_SERVICE)
        .unwrap();
    let loans = registry.resolve(LOAN_WRITE_PLATFORM_SERVICE).unwrap();

    let loan = applications.submit_application(application()).await.unwrap();
    applications
        .approve_application(loan.id, date(2025, 1, 20))
        .await
        .unwrap();
    loans.disburse(loan.id, date(2025, 2, 1)).await.unwrap();
    loans
        .make_repayment(loan.id, Money::new("USD", 20_000), date(2025, 3, 1))
        .await
        .unwrap();

    let batches = journal.batches.lock().unwrap();
    assert_eq!(batches.len(), 2);
    // Each posting carries only the transactions new since the last one.
    for batch in batches.iter() {
        let transactions = batch["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
    }
    assert_eq!(
        batches[1]["transactions"][0]["type"].as_str(),
        Some("repayment")
    );
}
