use chrono::NaiveDate;

use super::domain::{HistoryEntry, UserId};
use crate::scoring::ConsumerProfile;

/// Read access to consumer profiles (owned by the account system).
pub trait ProfileRepository: Send + Sync {
    fn lookup(&self, user_id: &UserId) -> Result<ConsumerProfile, RepositoryError>;
}

/// Storage abstraction for saved scans, keyed by user, date, and name.
pub trait HistoryRepository: Send + Sync {
    fn insert(&self, entry: HistoryEntry) -> Result<HistoryEntry, RepositoryError>;
    fn list(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, RepositoryError>;
    fn delete(&self, user_id: &UserId, date: NaiveDate, name: &str)
        -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
