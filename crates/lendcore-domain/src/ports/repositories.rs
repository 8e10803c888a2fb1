//! Repository ports

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::loan::Loan;

/// Loan persistence with not-found detection
///
/// The wrapper-style contract: `find_by_id` fails with
/// [`crate::Error::NotFound`] instead of returning an option, so callers
/// never handle absence inline.
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Persist a loan, inserting or replacing by id
    async fn save(&self, loan: Loan) -> Result<Loan>;

    /// Fetch a loan, failing if it does not exist
    async fn find_by_id(&self, id: Uuid) -> Result<Loan>;

    /// All loans, in no particular order
    async fn find_all(&self) -> Result<Vec<Loan>>;
}
