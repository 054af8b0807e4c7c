use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::domain::{
    parse_entry_id, HistoryEntry, NewHistoryEntry, ScanOutcome, ScanRequest, UserId,
};
use super::extractor::{ExtractorError, NutrientExtractor};
use super::repository::{HistoryRepository, ProfileRepository, RepositoryError};
use crate::ledger::{LedgerRow, LedgerStore};
use crate::scoring::{
    score, ConsumerProfile, NutrientReading, NutritionScoringError, MAX_RATING, MIN_RATING,
};

const DEFAULT_WEIGHT_GRAMS: f64 = 100.0;

/// Service composing the profile store, label extractor, scoring engine, ledger, and
/// scan history.
pub struct ScanService<P, H, L, X> {
    profiles: Arc<P>,
    history: Arc<H>,
    ledger: Arc<L>,
    extractor: Arc<X>,
    default_weight_grams: f64,
}

impl<P, H, L, X> ScanService<P, H, L, X>
where
    P: ProfileRepository + 'static,
    H: HistoryRepository + 'static,
    L: LedgerStore + 'static,
    X: NutrientExtractor + 'static,
{
    pub fn new(profiles: Arc<P>, history: Arc<H>, ledger: Arc<L>, extractor: Arc<X>) -> Self {
        Self {
            profiles,
            history,
            ledger,
            extractor,
            default_weight_grams: DEFAULT_WEIGHT_GRAMS,
        }
    }

    pub fn with_default_weight(mut self, grams: f64) -> Self {
        self.default_weight_grams = grams;
        self
    }

    pub fn default_weight_grams(&self) -> f64 {
        self.default_weight_grams
    }

    /// Fetch the profile used to personalize a user's ratings.
    pub fn profile(&self, user_id: &UserId) -> Result<ConsumerProfile, ScanServiceError> {
        self.profiles.lookup(user_id).map_err(|err| match err {
            RepositoryError::NotFound => ScanServiceError::ProfileNotFound(user_id.clone()),
            other => ScanServiceError::Repository(other),
        })
    }

    /// Dispatch an inbound request to the reading or image path.
    pub fn submit(&self, request: ScanRequest) -> Result<ScanOutcome, ScanServiceError> {
        let ScanRequest {
            user_id,
            weight_grams,
            reading,
            image_path,
        } = request;

        match (reading, image_path) {
            (Some(reading), _) => self.score_reading(&user_id, &reading, weight_grams),
            (None, Some(image)) => self.score_image(&user_id, &image, weight_grams),
            (None, None) => Err(ScanServiceError::MissingInput),
        }
    }

    /// Extract the label behind `image` and rate it for the user.
    pub fn score_image(
        &self,
        user_id: &UserId,
        image: &Path,
        weight_grams: Option<f64>,
    ) -> Result<ScanOutcome, ScanServiceError> {
        let profile = self.profile(user_id)?;
        let reading = self.extractor.extract(image).map_err(|err| {
            warn!(%user_id, image = %image.display(), error = %err, "label extraction failed");
            ScanServiceError::Extractor(err)
        })?;
        self.rate(user_id, &profile, &reading, weight_grams)
    }

    /// Rate an already extracted reading for the user.
    pub fn score_reading(
        &self,
        user_id: &UserId,
        reading: &NutrientReading,
        weight_grams: Option<f64>,
    ) -> Result<ScanOutcome, ScanServiceError> {
        let profile = self.profile(user_id)?;
        self.rate(user_id, &profile, reading, weight_grams)
    }

    fn rate(
        &self,
        user_id: &UserId,
        profile: &ConsumerProfile,
        reading: &NutrientReading,
        weight_grams: Option<f64>,
    ) -> Result<ScanOutcome, ScanServiceError> {
        let weight_grams = weight_grams.unwrap_or(self.default_weight_grams);
        let rating = score(profile, reading, weight_grams)?;

        // The rating stands even if the ledger is down.
        let ledger_error = match self.ledger.append(&LedgerRow::from_rating(&rating)) {
            Ok(()) => None,
            Err(err) => {
                warn!(%user_id, error = %err, "failed to append scan to ledger");
                Some(err.to_string())
            }
        };

        info!(
            %user_id,
            category = %rating.category,
            final_rating = rating.final_rating,
            weight_grams,
            persisted = ledger_error.is_none(),
            "scan rated"
        );

        Ok(ScanOutcome {
            user_id: user_id.clone(),
            weight_grams,
            persisted: ledger_error.is_none(),
            ledger_error,
            rating,
        })
    }

    /// Save a scan to the user's history, dated today (UTC).
    pub fn record_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, ScanServiceError> {
        self.record_history_on(entry, Utc::now().date_naive())
    }

    pub fn record_history_on(
        &self,
        entry: NewHistoryEntry,
        date: NaiveDate,
    ) -> Result<HistoryEntry, ScanServiceError> {
        let NewHistoryEntry {
            user_id,
            name,
            final_rating,
            calories,
        } = entry;

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ScanServiceError::InvalidHistoryEntry(
                "name must not be empty".to_string(),
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&final_rating) {
            return Err(ScanServiceError::InvalidHistoryEntry(format!(
                "final_rating {final_rating} outside {MIN_RATING}..={MAX_RATING}"
            )));
        }
        if !calories.is_finite() || calories < 0.0 {
            return Err(ScanServiceError::InvalidHistoryEntry(format!(
                "calories {calories} must be a non-negative number"
            )));
        }

        let stored = self.history.insert(HistoryEntry {
            user_id,
            date,
            name,
            final_rating,
            calories,
        })?;
        info!(user_id = %stored.user_id, entry_id = %stored.entry_id(), "history entry saved");
        Ok(stored)
    }

    /// Saved scans for a user; an unknown user simply has no history.
    pub fn history(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, ScanServiceError> {
        Ok(self.history.list(user_id)?)
    }

    /// Delete a saved scan by its `"<date> <name>"` id.
    pub fn delete_history(&self, user_id: &UserId, entry_id: &str) -> Result<(), ScanServiceError> {
        let (date, name) = parse_entry_id(entry_id)
            .ok_or_else(|| ScanServiceError::InvalidEntryId(entry_id.to_string()))?;

        self.history
            .delete(user_id, date, &name)
            .map_err(|err| match err {
                RepositoryError::NotFound => {
                    ScanServiceError::HistoryEntryNotFound(entry_id.to_string())
                }
                other => ScanServiceError::Repository(other),
            })?;
        info!(%user_id, entry_id, "history entry deleted");
        Ok(())
    }
}

/// Error raised by the scan service.
#[derive(Debug, thiserror::Error)]
pub enum ScanServiceError {
    #[error("no profile found for user {0}")]
    ProfileNotFound(UserId),
    #[error("label extraction failed: {0}")]
    Extractor(#[source] ExtractorError),
    #[error(transparent)]
    Scoring(#[from] NutritionScoringError),
    #[error("scan request needs either a reading or an image path")]
    MissingInput,
    #[error("invalid history entry: {0}")]
    InvalidHistoryEntry(String),
    #[error("invalid history entry id '{0}' (expected \"YYYY-MM-DD name\")")]
    InvalidEntryId(String),
    #[error("history entry '{0}' not found")]
    HistoryEntryNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
