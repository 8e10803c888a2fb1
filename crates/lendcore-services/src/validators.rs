//! Default validators
//!
//! Each validator is a stateless check invoked by the write services before
//! any state change. Failures carry the offending field in the message.

use lendcore_domain::commands::{ChargeSpec, LoanApplicationCommand};
use lendcore_domain::loan::{Loan, LoanStatus, Money};
use lendcore_domain::ports::{
    LoanApplicationValidator, LoanChargeValidator, LoanDisbursementValidator, LoanRefundValidator,
    LoanTransactionValidator,
};
use lendcore_domain::{Error, Result};

fn check_currency(loan: &Loan, amount: &Money) -> Result<()> {
    if loan.currency() == amount.currency {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "currency mismatch: loan is {}, amount is {}",
            loan.currency(),
            amount.currency
        )))
    }
}

/// Default application submission checks
#[derive(Debug, Default)]
pub struct DefaultLoanApplicationValidator;

impl LoanApplicationValidator for DefaultLoanApplicationValidator {
    fn validate_submission(&self, command: &LoanApplicationCommand) -> Result<()> {
        if command.client.trim().is_empty() {
            return Err(Error::validation("client must not be empty"));
        }
        if !command.principal.is_positive() {
            return Err(Error::validation("principal must be positive"));
        }
        if command.term_months == 0 {
            return Err(Error::validation("term must be at least one month"));
        }
        for charge in &command.charges {
            if !charge.amount.is_positive() {
                return Err(Error::validation(format!(
                    "charge '{}' must have a positive amount",
                    charge.name
                )));
            }
            if charge.amount.currency != command.principal.currency {
                return Err(Error::validation(format!(
                    "charge '{}' currency differs from the loan currency",
                    charge.name
                )));
            }
        }
        Ok(())
    }
}

/// Default repayment checks
#[derive(Debug, Default)]
pub struct DefaultLoanTransactionValidator;

impl LoanTransactionValidator for DefaultLoanTransactionValidator {
    fn validate_repayment(&self, loan: &Loan, amount: &Money) -> Result<()> {
        if loan.status != LoanStatus::Active {
            return Err(Error::validation(format!(
                "repayments require an active loan, status is {}",
                loan.status
            )));
        }
        if !amount.is_positive() {
            return Err(Error::validation("repayment must be positive"));
        }
        check_currency(loan, amount)?;
        if amount.amount_minor > loan.outstanding_principal() {
            return Err(Error::validation(
                "repayment exceeds the outstanding principal",
            ));
        }
        Ok(())
    }
}

/// Default disbursement checks
#[derive(Debug, Default)]
pub struct DefaultLoanDisbursementValidator;

impl LoanDisbursementValidator for DefaultLoanDisbursementValidator {
    fn validate_disbursement(&self, loan: &Loan) -> Result<()> {
        if loan.status != LoanStatus::Approved {
            return Err(Error::validation(format!(
                "only approved loans can be disbursed, status is {}",
                loan.status
            )));
        }
        if loan.schedule.is_empty() {
            return Err(Error::validation(
                "loan has no repayment schedule to disburse against",
            ));
        }
        Ok(())
    }
}

/// Default charge checks
#[derive(Debug, Default)]
pub struct DefaultLoanChargeValidator;

impl LoanChargeValidator for DefaultLoanChargeValidator {
    fn validate_charge(&self, loan: &Loan, spec: &ChargeSpec) -> Result<()> {
        if matches!(
            loan.status,
            LoanStatus::Rejected | LoanStatus::ClosedObligationsMet | LoanStatus::ChargedOff
        ) {
            return Err(Error::validation(format!(
                "charges cannot attach to a loan in status {}",
                loan.status
            )));
        }
        if !spec.amount.is_positive() {
            return Err(Error::validation("charge amount must be positive"));
        }
        check_currency(loan, &spec.amount)
    }
}

/// Default refund checks
#[derive(Debug, Default)]
pub struct DefaultLoanRefundValidator;

impl LoanRefundValidator for DefaultLoanRefundValidator {
    fn validate_refund(&self, loan: &Loan, amount: &Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(Error::validation("refund must be positive"));
        }
        check_currency(loan, amount)?;
        if amount.amount_minor > loan.total_repaid() {
            return Err(Error::validation("refund exceeds the amount repaid"));
        }
        Ok(())
    }
}
