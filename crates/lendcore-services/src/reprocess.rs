//! Transaction reprocessing
//!
//! Replaying keeps a loan's transactions in value-date order so derived
//! balances stay consistent after backdated entries, reversals, or charge
//! removal. Every replay publishes a `LoanTransactionsReplayed` event.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use lendcore_domain::events::BusinessEvent;
use lendcore_domain::loan::{Loan, LoanTransaction};
use lendcore_domain::ports::{BusinessEventNotifierService, ReprocessLoanTransactionsService};
use lendcore_domain::{Error, Result};
use tracing::debug;
use uuid::Uuid;

/// Default replay implementation
pub struct DefaultReprocessLoanTransactionsService {
    notifier: Arc<dyn BusinessEventNotifierService>,
}

impl DefaultReprocessLoanTransactionsService {
    /// Create the service over an event notifier
    pub fn new(notifier: Arc<dyn BusinessEventNotifierService>) -> Self {
        Self { notifier }
    }

    async fn replay(&self, loan: &mut Loan) -> Result<()> {
        loan.transactions.sort_by_key(|tx| tx.transaction_date);
        let count = loan.transactions.iter().filter(|tx| !tx.reversed).count();
        debug!(loan_id = %loan.id, count, "replayed loan transactions");
        self.notifier
            .notify(BusinessEvent::LoanTransactionsReplayed {
                loan_id: loan.id,
                count,
            })
            .await
    }
}

#[async_trait]
impl ReprocessLoanTransactionsService for DefaultReprocessLoanTransactionsService {
    async fn reprocess_transactions(&self, loan: &mut Loan) -> Result<()> {
        self.replay(loan).await
    }

    async fn reprocess_transactions_with(
        &self,
        loan: &mut Loan,
        transactions: Vec<LoanTransaction>,
    ) -> Result<()> {
        loan.transactions = transactions;
        self.replay(loan).await
    }

    async fn reprocess_transactions_with_post_transaction_checks(
        &self,
        loan: &mut Loan,
        transaction_date: NaiveDate,
    ) -> Result<()> {
        self.replay(loan).await?;
        if let Some(tx) = loan
            .transactions
            .iter()
            .find(|tx| !tx.reversed && tx.transaction_date > transaction_date)
        {
            return Err(Error::validation(format!(
                "transaction {} is dated after the reprocessing cut-off {}",
                tx.id, transaction_date
            )));
        }
        if loan.total_repaid() > loan.principal.amount_minor {
            return Err(Error::validation(
                "replayed repayments exceed the loan principal",
            ));
        }
        Ok(())
    }

    async fn process_post_disbursement_transactions(&self, loan: &mut Loan) -> Result<()> {
        let disbursed_on = loan
            .disbursed_on
            .ok_or_else(|| Error::invalid_argument("loan has not been disbursed"))?;

        // Pre-disbursement entries keep their recorded order; everything
        // after the disbursement date is replayed by value date.
        let (mut kept, mut post): (Vec<_>, Vec<_>) = loan
            .transactions
            .drain(..)
            .partition(|tx| tx.transaction_date < disbursed_on);
        post.sort_by_key(|tx| tx.transaction_date);
        let count = post.iter().filter(|tx| !tx.reversed).count();
        kept.extend(post);
        loan.transactions = kept;

        self.notifier
            .notify(BusinessEvent::LoanTransactionsReplayed {
                loan_id: loan.id,
                count,
            })
            .await
    }

    async fn remove_loan_charge(&self, loan: &mut Loan, charge_id: Uuid) -> Result<()> {
        let before = loan.charges.len();
        loan.charges.retain(|charge| charge.id != charge_id);
        if loan.charges.len() == before {
            return Err(Error::not_found(format!("loan charge {charge_id}")));
        }
        self.replay(loan).await
    }

    async fn process_latest_transaction(
        &self,
        transaction: LoanTransaction,
        loan: &mut Loan,
    ) -> Result<()> {
        loan.transactions.push(transaction);
        self.replay(loan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TokioBroadcastEventNotifier;
    use lendcore_domain::loan::{ExternalId, LoanStatus, Money, TransactionType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(ext: &str, kind: TransactionType, amount: i64, on: NaiveDate) -> LoanTransaction {
        LoanTransaction::new(ExternalId::new(ext), kind, Money::new("USD", amount), on)
    }

    fn loan() -> Loan {
        Loan {
            id: Uuid::new_v4(),
            external_id: ExternalId::new("ext"),
            client: "acme".into(),
            principal: Money::new("USD", 100_000),
            term_months: 10,
            status: LoanStatus::Active,
            submitted_on: date(2025, 1, 1),
            approved_on: None,
            disbursed_on: Some(date(2025, 1, 10)),
            schedule: Vec::new(),
            charges: Vec::new(),
            transactions: Vec::new(),
        }
    }

    fn service() -> DefaultReprocessLoanTransactionsService {
        DefaultReprocessLoanTransactionsService::new(Arc::new(TokioBroadcastEventNotifier::new()))
    }

    #[tokio::test]
    async fn replay_orders_by_value_date() {
        let mut loan = loan();
        loan.transactions = vec![
            tx("b", TransactionType::Repayment, 10_000, date(2025, 3, 1)),
            tx("a", TransactionType::Disbursement, 100_000, date(2025, 1, 10)),
            tx("c", TransactionType::Repayment, 5_000, date(2025, 2, 1)),
        ];
        service().reprocess_transactions(&mut loan).await.unwrap();
        let dates: Vec<_> = loan
            .transactions
            .iter()
            .map(|t| t.transaction_date)
            .collect();
        assert_eq!(
            dates,
            vec![date(2025, 1, 10), date(2025, 2, 1), date(2025, 3, 1)]
        );
    }

    #[tokio::test]
    async fn post_transaction_checks_reject_future_dated_entries() {
        let mut loan = loan();
        loan.transactions = vec![tx(
            "late",
            TransactionType::Repayment,
            1_000,
            date(2025, 6, 1),
        )];
        let err = service()
            .reprocess_transactions_with_post_transaction_checks(&mut loan, date(2025, 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn removing_a_missing_charge_is_not_found() {
        let mut loan = loan();
        let err = service()
            .remove_loan_charge(&mut loan, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn replay_publishes_an_event() {
        let notifier = Arc::new(TokioBroadcastEventNotifier::new());
        let mut rx = notifier.subscribe();
        let service = DefaultReprocessLoanTransactionsService::new(notifier);

        let mut loan = loan();
        loan.transactions = vec![tx("a", TransactionType::Repayment, 1_000, date(2025, 2, 1))];
        service.reprocess_transactions(&mut loan).await.unwrap();

        match rx.recv().await.unwrap() {
            BusinessEvent::LoanTransactionsReplayed { count, .. } => assert_eq!(count, 1),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
