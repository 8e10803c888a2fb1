//! Loan aggregate and the value objects that travel with it
//!
//! Amounts are carried in minor units (cents) of the loan currency. The
//! accounting bridge data derived here is the hand-off format consumed by the
//! journal-entry write service: a flat JSON map per posting batch, so the
//! accounting side never needs the loan aggregate itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pre-computed accounting hand-off map, one per posting batch
pub type AccountingBridgeData = serde_json::Map<String, serde_json::Value>;

/// Opaque identifier correlating platform records with external systems
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId(String);

impl ExternalId {
    /// Wrap an externally supplied identifier
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monetary amount in minor units of a currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// ISO 4217 currency code
    pub currency: String,
    /// Amount in minor units (e.g. cents)
    pub amount_minor: i64,
}

impl Money {
    /// Create an amount in minor units of the given currency
    pub fn new(currency: impl Into<String>, amount_minor: i64) -> Self {
        Self {
            currency: currency.into(),
            amount_minor,
        }
    }

    /// Zero in the given currency
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(currency, 0)
    }

    /// Whether the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount_minor, self.currency)
    }
}

/// Loan account lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// Application received, awaiting a decision
    SubmittedAndPendingApproval,
    /// Application approved, not yet disbursed
    Approved,
    /// Application rejected
    Rejected,
    /// Funds disbursed, repayments expected
    Active,
    /// All obligations met
    ClosedObligationsMet,
    /// Written off the books
    ChargedOff,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::SubmittedAndPendingApproval => "submitted_and_pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Active => "active",
            Self::ClosedObligationsMet => "closed_obligations_met",
            Self::ChargedOff => "charged_off",
        };
        f.write_str(label)
    }
}

/// Events the lifecycle state machine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanLifecycleEvent {
    /// Approve a pending application
    Approve,
    /// Reject a pending application
    Reject,
    /// Disburse an approved loan
    Disburse,
    /// Final repayment received
    RepayInFull,
    /// Write the loan off
    ChargeOff,
}

impl std::fmt::Display for LoanLifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Disburse => "disburse",
            Self::RepayInFull => "repay_in_full",
            Self::ChargeOff => "charge_off",
        };
        f.write_str(label)
    }
}

/// Kinds of monetary movements on a loan account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Principal paid out to the client
    Disbursement,
    /// Repayment received from the client
    Repayment,
    /// Money returned to the client
    Refund,
    /// Outstanding balance written off
    ChargeOff,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Disbursement => "disbursement",
            Self::Repayment => "repayment",
            Self::Refund => "refund",
            Self::ChargeOff => "charge_off",
        };
        f.write_str(label)
    }
}

/// A monetary movement recorded against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTransaction {
    /// Transaction identifier
    pub id: Uuid,
    /// Correlation id for external systems
    pub external_id: ExternalId,
    /// Kind of movement
    pub kind: TransactionType,
    /// Amount moved
    pub amount: Money,
    /// Value date of the movement
    pub transaction_date: NaiveDate,
    /// Whether the movement was reversed
    pub reversed: bool,
}

impl LoanTransaction {
    /// Record a new, non-reversed transaction
    pub fn new(
        external_id: ExternalId,
        kind: TransactionType,
        amount: Money,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_id,
            kind,
            amount,
            transaction_date,
            reversed: false,
        }
    }
}

/// A fee or penalty attached to a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanCharge {
    /// Charge identifier
    pub id: Uuid,
    /// Human-readable charge name
    pub name: String,
    /// Charge amount
    pub amount: Money,
    /// Whether the charge has been paid
    pub paid: bool,
}

/// One row of the repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentInstallment {
    /// 1-based installment number
    pub number: u32,
    /// Date the installment falls due
    pub due_date: NaiveDate,
    /// Principal portion due
    pub principal: Money,
}

/// The loan account aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    /// Loan identifier
    pub id: Uuid,
    /// Correlation id for external systems
    pub external_id: ExternalId,
    /// Client the loan belongs to
    pub client: String,
    /// Contractual principal
    pub principal: Money,
    /// Repayment term in months
    pub term_months: u32,
    /// Current lifecycle status
    pub status: LoanStatus,
    /// Date the application was submitted
    pub submitted_on: NaiveDate,
    /// Date the application was approved, if it was
    pub approved_on: Option<NaiveDate>,
    /// Date funds were disbursed, if they were
    pub disbursed_on: Option<NaiveDate>,
    /// Repayment schedule
    pub schedule: Vec<RepaymentInstallment>,
    /// Fees and penalties
    pub charges: Vec<LoanCharge>,
    /// Monetary movements, in recording order
    pub transactions: Vec<LoanTransaction>,
}

impl Loan {
    /// Currency code of the loan
    pub fn currency(&self) -> &str {
        &self.principal.currency
    }

    /// Whether the loan has been written off
    pub fn is_charged_off(&self) -> bool {
        self.status == LoanStatus::ChargedOff
    }

    /// Sum of non-reversed repayments, in minor units
    pub fn total_repaid(&self) -> i64 {
        self.transactions
            .iter()
            .filter(|tx| !tx.reversed && tx.kind == TransactionType::Repayment)
            .map(|tx| tx.amount.amount_minor)
            .sum()
    }

    /// Principal still owed, in minor units
    pub fn outstanding_principal(&self) -> i64 {
        (self.principal.amount_minor - self.total_repaid()).max(0)
    }

    /// Ids of all current transactions
    pub fn transaction_ids(&self) -> Vec<Uuid> {
        self.transactions.iter().map(|tx| tx.id).collect()
    }

    /// Ids of all currently reversed transactions
    pub fn reversed_transaction_ids(&self) -> Vec<Uuid> {
        self.transactions
            .iter()
            .filter(|tx| tx.reversed)
            .map(|tx| tx.id)
            .collect()
    }

    /// Value date of the charge-off transaction, if one exists
    pub fn charged_off_on(&self) -> Option<NaiveDate> {
        self.transactions
            .iter()
            .find(|tx| !tx.reversed && tx.kind == TransactionType::ChargeOff)
            .map(|tx| tx.transaction_date)
    }

    /// Derive the accounting hand-off map for one posting batch
    ///
    /// Only transactions not present in `existing_transaction_ids`, plus
    /// transactions whose reversal is newer than
    /// `existing_reversed_transaction_ids`, are included: callers snapshot
    /// the id lists before mutating the loan and post the delta afterwards.
    pub fn derive_accounting_bridge_data(
        &self,
        existing_transaction_ids: &[Uuid],
        existing_reversed_transaction_ids: &[Uuid],
    ) -> AccountingBridgeData {
        let new_transactions: Vec<serde_json::Value> = self
            .transactions
            .iter()
            .filter(|tx| {
                !existing_transaction_ids.contains(&tx.id)
                    || (tx.reversed && !existing_reversed_transaction_ids.contains(&tx.id))
            })
            .map(transaction_bridge_entry)
            .collect();

        let mut data = AccountingBridgeData::new();
        data.insert("loan_id".into(), self.id.to_string().into());
        data.insert("external_id".into(), self.external_id.as_str().into());
        data.insert("currency".into(), self.currency().into());
        data.insert("charged_off".into(), self.is_charged_off().into());
        data.insert("transactions".into(), new_transactions.into());
        data
    }

    /// Derive posting batches for a charged-off loan
    ///
    /// Movements dated before the charge-off post to the regular accounts;
    /// movements on or after it post to the charge-off accounts, so the two
    /// phases are handed over as separate batches.
    pub fn derive_accounting_bridge_data_for_charge_off(
        &self,
        existing_transaction_ids: &[Uuid],
        existing_reversed_transaction_ids: &[Uuid],
    ) -> Vec<AccountingBridgeData> {
        let Some(charge_off_date) = self.charged_off_on() else {
            return vec![self.derive_accounting_bridge_data(
                existing_transaction_ids,
                existing_reversed_transaction_ids,
            )];
        };

        let mut before = self.clone();
        before
            .transactions
            .retain(|tx| tx.transaction_date < charge_off_date);
        let mut after = self.clone();
        after
            .transactions
            .retain(|tx| tx.transaction_date >= charge_off_date);

        let mut batches = Vec::with_capacity(2);
        for (phase, slice) in [("before_charge_off", before), ("on_or_after_charge_off", after)] {
            let mut data = slice.derive_accounting_bridge_data(
                existing_transaction_ids,
                existing_reversed_transaction_ids,
            );
            data.insert("charge_off_phase".into(), phase.into());
            batches.push(data);
        }
        batches
    }
}

fn transaction_bridge_entry(tx: &LoanTransaction) -> serde_json::Value {
    serde_json::json!({
        "id": tx.id.to_string(),
        "external_id": tx.external_id.as_str(),
        "type": tx.kind.to_string(),
        "amount_minor": tx.amount.amount_minor,
        "currency": tx.amount.currency,
        "date": tx.transaction_date.to_string(),
        "reversed": tx.reversed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_loan() -> Loan {
        Loan {
            id: Uuid::new_v4(),
            external_id: ExternalId::new("ext-1"),
            client: "acme".into(),
            principal: Money::new("USD", 120_000),
            term_months: 12,
            status: LoanStatus::Active,
            submitted_on: date(2025, 1, 10),
            approved_on: Some(date(2025, 1, 12)),
            disbursed_on: Some(date(2025, 1, 15)),
            schedule: Vec::new(),
            charges: Vec::new(),
            transactions: Vec::new(),
        }
    }

    #[test]
    fn outstanding_principal_nets_repayments() {
        let mut loan = sample_loan();
        loan.transactions.push(LoanTransaction::new(
            ExternalId::new("tx-1"),
            TransactionType::Repayment,
            Money::new("USD", 20_000),
            date(2025, 2, 15),
        ));
        assert_eq!(loan.total_repaid(), 20_000);
        assert_eq!(loan.outstanding_principal(), 100_000);
    }

    #[test]
    fn reversed_repayments_do_not_count() {
        let mut loan = sample_loan();
        let mut tx = LoanTransaction::new(
            ExternalId::new("tx-1"),
            TransactionType::Repayment,
            Money::new("USD", 20_000),
            date(2025, 2, 15),
        );
        tx.reversed = true;
        loan.transactions.push(tx);
        assert_eq!(loan.total_repaid(), 0);
    }

    #[test]
    fn bridge_data_contains_only_new_transactions() {
        let mut loan = sample_loan();
        let old = LoanTransaction::new(
            ExternalId::new("tx-old"),
            TransactionType::Disbursement,
            Money::new("USD", 120_000),
            date(2025, 1, 15),
        );
        let existing = vec![old.id];
        loan.transactions.push(old);
        loan.transactions.push(LoanTransaction::new(
            ExternalId::new("tx-new"),
            TransactionType::Repayment,
            Money::new("USD", 10_000),
            date(2025, 2, 15),
        ));

        let data = loan.derive_accounting_bridge_data(&existing, &[]);
        let txs = data["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0]["external_id"], "tx-new");
        assert_eq!(data["currency"], "USD");
    }

    #[test]
    fn newly_reversed_transaction_is_included_again() {
        let mut loan = sample_loan();
        let mut tx = LoanTransaction::new(
            ExternalId::new("tx-1"),
            TransactionType::Repayment,
            Money::new("USD", 10_000),
            date(2025, 2, 15),
        );
        let existing = vec![tx.id];
        tx.reversed = true;
        loan.transactions.push(tx);

        let data = loan.derive_accounting_bridge_data(&existing, &[]);
        let txs = data["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0]["reversed"], true);
    }

    #[test]
    fn charge_off_bridge_data_splits_into_two_phases() {
        let mut loan = sample_loan();
        loan.status = LoanStatus::ChargedOff;
        loan.transactions.push(LoanTransaction::new(
            ExternalId::new("tx-1"),
            TransactionType::Repayment,
            Money::new("USD", 10_000),
            date(2025, 2, 15),
        ));
        loan.transactions.push(LoanTransaction::new(
            ExternalId::new("tx-2"),
            TransactionType::ChargeOff,
            Money::new("USD", 110_000),
            date(2025, 3, 1),
        ));

        let batches = loan.derive_accounting_bridge_data_for_charge_off(&[], &[]);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0]["charge_off_phase"], "before_charge_off");
        assert_eq!(
            batches[0]["transactions"].as_array().unwrap().len(),
            1,
            "repayment predates the charge-off"
        );
        assert_eq!(batches[1]["charge_off_phase"], "on_or_after_charge_off");
        assert_eq!(batches[1]["transactions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn loan_without_charge_off_yields_single_batch() {
        let loan = sample_loan();
        let batches = loan.derive_accounting_bridge_data_for_charge_off(&[], &[]);
        assert_eq!(batches.len(), 1);
        assert!(!batches[0].contains_key("charge_off_phase"));
    }
}
