//! Scan intake: label extraction, personalized rating, ledger persistence, and the
//! per-user history of saved scans.

pub mod domain;
pub mod extractor;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    parse_entry_id, HistoryEntry, NewHistoryEntry, ScanOutcome, ScanRequest, UserId,
};
pub use extractor::{parse_label_table, ExtractorError, LabelTableExtractor, NutrientExtractor};
pub use repository::{HistoryRepository, ProfileRepository, RepositoryError};
pub use router::scan_router;
pub use service::{ScanService, ScanServiceError};
