use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::ledger::{LedgerError, LedgerRow, LedgerStore};
use crate::scans::domain::{HistoryEntry, UserId};
use crate::scans::extractor::{ExtractorError, NutrientExtractor};
use crate::scans::repository::{HistoryRepository, ProfileRepository, RepositoryError};
use crate::scans::{scan_router, ScanService};
use crate::scoring::{ConsumerProfile, Gender, Nutrient, NutrientReading};

pub(super) const KNOWN_USER: &str = "user-1";

pub(super) fn known_user() -> UserId {
    UserId::new(KNOWN_USER)
}

pub(super) fn male_profile() -> ConsumerProfile {
    ConsumerProfile::new(34, Gender::Male)
}

/// 20 g protein, 10 g fiber, 400 mg sodium per 100 g.
pub(super) fn protein_bar() -> NutrientReading {
    NutrientReading::new()
        .with(Nutrient::Proteins, 20.0)
        .and_then(|r| r.with(Nutrient::Fiber, 10.0))
        .and_then(|r| r.with(Nutrient::Sodium, 400.0))
        .expect("valid reading")
}

pub(super) fn history_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 2).expect("valid date")
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    profiles: Mutex<HashMap<UserId, ConsumerProfile>>,
}

impl MemoryProfiles {
    pub(super) fn with_profile(user_id: UserId, profile: ConsumerProfile) -> Self {
        let store = Self::default();
        store
            .profiles
            .lock()
            .expect("profiles mutex")
            .insert(user_id, profile);
        store
    }
}

impl ProfileRepository for MemoryProfiles {
    fn lookup(&self, user_id: &UserId) -> Result<ConsumerProfile, RepositoryError> {
        self.profiles
            .lock()
            .expect("profiles mutex")
            .get(user_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableProfiles;

impl ProfileRepository for UnavailableProfiles {
    fn lookup(&self, _user_id: &UserId) -> Result<ConsumerProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("profile store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub(super) fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().expect("history mutex").clone()
    }
}

impl HistoryRepository for MemoryHistory {
    fn insert(&self, entry: HistoryEntry) -> Result<HistoryEntry, RepositoryError> {
        let mut guard = self.entries.lock().expect("history mutex");
        guard.retain(|existing| {
            !(existing.user_id == entry.user_id
                && existing.date == entry.date
                && existing.name == entry.name)
        });
        guard.push(entry.clone());
        Ok(entry)
    }

    fn list(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let guard = self.entries.lock().expect("history mutex");
        Ok(guard
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect())
    }

    fn delete(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.entries.lock().expect("history mutex");
        let before = guard.len();
        guard.retain(|entry| {
            !(&entry.user_id == user_id && entry.date == date && entry.name == name)
        });
        if guard.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub(super) struct MemoryLedger {
    rows: Mutex<Vec<LedgerRow>>,
}

impl MemoryLedger {
    pub(super) fn rows(&self) -> Vec<LedgerRow> {
        self.rows.lock().expect("ledger mutex").clone()
    }
}

impl LedgerStore for MemoryLedger {
    fn append(&self, row: &LedgerRow) -> Result<(), LedgerError> {
        self.rows.lock().expect("ledger mutex").push(row.clone());
        Ok(())
    }
}

pub(super) struct FailingLedger;

impl LedgerStore for FailingLedger {
    fn append(&self, _row: &LedgerRow) -> Result<(), LedgerError> {
        Err(LedgerError::Unavailable("disk full".to_string()))
    }
}

/// Returns a fixed reading for any image, or fails when built with `failing`.
pub(super) struct StubExtractor {
    reading: Option<NutrientReading>,
}

impl StubExtractor {
    pub(super) fn returning(reading: NutrientReading) -> Self {
        Self {
            reading: Some(reading),
        }
    }

    pub(super) fn failing() -> Self {
        Self { reading: None }
    }
}

impl NutrientExtractor for StubExtractor {
    fn extract(&self, _image: &Path) -> Result<NutrientReading, ExtractorError> {
        self.reading.clone().ok_or(ExtractorError::NoNutrients)
    }
}

pub(super) type TestService = ScanService<MemoryProfiles, MemoryHistory, MemoryLedger, StubExtractor>;

pub(super) fn build_service() -> (Arc<TestService>, Arc<MemoryHistory>, Arc<MemoryLedger>) {
    let history = Arc::new(MemoryHistory::default());
    let ledger = Arc::new(MemoryLedger::default());
    let service = Arc::new(ScanService::new(
        Arc::new(MemoryProfiles::with_profile(known_user(), male_profile())),
        history.clone(),
        ledger.clone(),
        Arc::new(StubExtractor::returning(protein_bar())),
    ));
    (service, history, ledger)
}

pub(super) fn router_with_service(service: Arc<TestService>) -> axum::Router {
    scan_router(service)
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
