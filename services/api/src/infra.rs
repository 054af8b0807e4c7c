use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use nutrilens::error::AppError;
use nutrilens::ledger::CsvLedger;
use nutrilens::scans::{
    HistoryEntry, HistoryRepository, LabelTableExtractor, ProfileRepository, RepositoryError,
    ScanService, UserId,
};
use nutrilens::scoring::ConsumerProfile;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Scan service as wired by the binary.
pub(crate) type ApiScanService = ScanService<
    InMemoryProfileRepository,
    InMemoryHistoryRepository,
    CsvLedger,
    LabelTableExtractor,
>;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    profiles: Arc<Mutex<HashMap<UserId, ConsumerProfile>>>,
}

impl InMemoryProfileRepository {
    /// Seed the store from a JSON object keyed by user id.
    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let profiles: HashMap<UserId, ConsumerProfile> = serde_json::from_str(&raw)?;
        info!(path = %path.display(), count = profiles.len(), "loaded consumer profiles");
        Ok(Self {
            profiles: Arc::new(Mutex::new(profiles)),
        })
    }

    #[cfg(test)]
    pub(crate) fn insert(
        &self,
        user_id: UserId,
        profile: ConsumerProfile,
    ) -> Result<(), RepositoryError> {
        lock(&self.profiles)?.insert(user_id, profile);
        Ok(())
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn lookup(&self, user_id: &UserId) -> Result<ConsumerProfile, RepositoryError> {
        lock(&self.profiles)?
            .get(user_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

type HistoryKey = (NaiveDate, String);

/// Per-user history, ordered by date then name. Saving the same name twice on one
/// day replaces the earlier entry.
#[derive(Default, Clone)]
pub(crate) struct InMemoryHistoryRepository {
    entries: Arc<Mutex<HashMap<UserId, BTreeMap<HistoryKey, HistoryEntry>>>>,
}

impl HistoryRepository for InMemoryHistoryRepository {
    fn insert(&self, entry: HistoryEntry) -> Result<HistoryEntry, RepositoryError> {
        let mut guard = lock(&self.entries)?;
        guard
            .entry(entry.user_id.clone())
            .or_default()
            .insert((entry.date, entry.name.clone()), entry.clone());
        Ok(entry)
    }

    fn list(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let guard = lock(&self.entries)?;
        Ok(guard
            .get(user_id)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default())
    }

    fn delete(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.entries)?;
        guard
            .get_mut(user_id)
            .and_then(|entries| entries.remove(&(date, name.to_string())))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrilens::scoring::{classify, Gender, ReferenceCategory};

    fn entry(name: &str, day: u32) -> HistoryEntry {
        HistoryEntry {
            user_id: UserId::new("user-1"),
            date: NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date"),
            name: name.to_string(),
            final_rating: 7.0,
            calories: 120.0,
        }
    }

    #[test]
    fn profiles_load_from_json_document() {
        let path =
            std::env::temp_dir().join(format!("nutrilens-profiles-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{
                "user-1": {"age": 41, "gender": "Female", "specialNeeds": ["High BP"]},
                "user-2": {"age": 12, "gender": null}
            }"#,
        )
        .expect("profiles written");

        let repository = InMemoryProfileRepository::from_path(&path).expect("profiles load");
        let first = repository.lookup(&UserId::new("user-1")).expect("user-1");
        assert_eq!(first.gender, Gender::Female);
        assert_eq!(classify(&first), ReferenceCategory::Hypertension);
        let second = repository.lookup(&UserId::new("user-2")).expect("user-2");
        assert_eq!(second.gender, Gender::Unspecified);
        assert!(matches!(
            repository.lookup(&UserId::new("user-3")),
            Err(RepositoryError::NotFound)
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_profile_document_is_reported() {
        let path = std::env::temp_dir()
            .join(format!("nutrilens-bad-profiles-{}.json", std::process::id()));
        std::fs::write(&path, "[1, 2, 3]").expect("file written");

        assert!(matches!(
            InMemoryProfileRepository::from_path(&path),
            Err(AppError::Json(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn history_lists_in_date_order_and_replaces_same_day_name() {
        let repository = InMemoryHistoryRepository::default();
        repository.insert(entry("Granola", 9)).expect("insert");
        repository.insert(entry("Apple", 3)).expect("insert");
        let mut updated = entry("Granola", 9);
        updated.final_rating = 4.0;
        repository.insert(updated).expect("insert");

        let listed = repository.list(&UserId::new("user-1")).expect("list");
        let names: Vec<_> = listed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Apple", "Granola"]);
        assert_eq!(listed[1].final_rating, 4.0);
        assert!(repository
            .list(&UserId::new("nobody"))
            .expect("list")
            .is_empty());
    }

    #[test]
    fn deleting_unknown_entry_is_not_found() {
        let repository = InMemoryHistoryRepository::default();
        repository.insert(entry("Apple", 3)).expect("insert");
        let date = NaiveDate::from_ymd_opt(2024, 5, 3).expect("valid date");

        repository
            .delete(&UserId::new("user-1"), date, "Apple")
            .expect("deleted");
        assert!(matches!(
            repository.delete(&UserId::new("user-1"), date, "Apple"),
            Err(RepositoryError::NotFound)
        ));
    }
}
