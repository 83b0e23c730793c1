use chrono::NaiveDate;
use sea_orm::{DbErr, TransactionError};
use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Failure taxonomy for the scoring engine. Not-found conditions are explicit
/// so handlers can map them to 404 instead of defaulting silently; everything
/// the store surfaces (conflicts, unavailability) funnels into `Db` and means
/// the whole operation had no effect and may be retried.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("no entry for user {user_id} on {date}")]
    EntryNotFound { user_id: String, date: NaiveDate },

    #[error("store error: {0}")]
    Db(#[from] DbErr),
}

impl From<TransactionError<ScoringError>> for ScoringError {
    fn from(err: TransactionError<ScoringError>) -> Self {
        match err {
            TransactionError::Connection(e) => ScoringError::Db(e),
            TransactionError::Transaction(e) => e,
        }
    }
}
