use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scoring::{NutrientReading, Rating};

/// Identifier of the consumer a scan belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inbound scan: either an already extracted reading or the label image to extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(alias = "userId")]
    pub user_id: UserId,
    /// Grams consumed; the service default applies when omitted.
    #[serde(default, alias = "weight")]
    pub weight_grams: Option<f64>,
    #[serde(default)]
    pub reading: Option<NutrientReading>,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

/// Result of one scan, returned even when the ledger could not record it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    pub user_id: UserId,
    pub weight_grams: f64,
    pub rating: Rating,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_error: Option<String>,
}

/// A scan the consumer chose to keep in their history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub name: String,
    pub final_rating: f64,
    pub calories: f64,
}

impl HistoryEntry {
    /// External identifier: `"<YYYY-MM-DD> <name>"`.
    pub fn entry_id(&self) -> String {
        format!("{} {}", self.date.format("%Y-%m-%d"), self.name)
    }
}

/// Split an entry id into its date and name.
pub fn parse_entry_id(raw: &str) -> Option<(NaiveDate, String)> {
    let (date, name) = raw.trim().split_once(' ')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((date, name.to_string()))
}

/// History payload before the service stamps it with a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    #[serde(alias = "userId")]
    pub user_id: UserId,
    pub name: String,
    pub final_rating: f64,
    #[serde(default)]
    pub calories: f64,
}
