//! Append-only CSV ledger of computed ratings.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::scoring::{Nutrient, Rating, NUTRIENT_VOCABULARY_VERSION};

/// Terminal ledger column holding the final rating.
pub const FINAL_RATING_FIELD: &str = "FINAL_RATING";

/// Ledger header: every nutrient in vocabulary order, then the final rating.
pub fn ledger_fields() -> Vec<&'static str> {
    Nutrient::ALL
        .iter()
        .map(|nutrient| nutrient.label())
        .chain(std::iter::once(FINAL_RATING_FIELD))
        .collect()
}

/// One ledger line, aligned with [`ledger_fields`]. Absent nutrients are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    values: Vec<String>,
}

impl LedgerRow {
    pub fn from_rating(rating: &Rating) -> Self {
        let values = Nutrient::ALL
            .iter()
            .map(|nutrient| {
                rating
                    .percentages
                    .get(*nutrient)
                    .map(format_value)
                    .unwrap_or_default()
            })
            .chain(std::iter::once(format_value(rating.final_rating)))
            .collect();
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value for a named column, `None` if the column is unknown.
    pub fn field(&self, name: &str) -> Option<&str> {
        ledger_fields()
            .iter()
            .position(|field| *field == name)
            .map(|index| self.values[index].as_str())
    }
}

fn format_value(value: f64) -> String {
    format!("{value:.4}")
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger encoding failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Destination for rating records. Implementations must serialize their own appends.
pub trait LedgerStore: Send + Sync {
    fn append(&self, row: &LedgerRow) -> Result<(), LedgerError>;
}

/// Write `row` to `writer`, preceded by the header when `with_header` is set.
pub fn write_row<W: Write>(writer: W, row: &LedgerRow, with_header: bool) -> Result<(), LedgerError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    if with_header {
        csv_writer.write_record(ledger_fields())?;
    }
    csv_writer.write_record(row.values())?;
    csv_writer.flush()?;
    Ok(())
}

/// CSV file ledger. The header is written only when the file is created (or empty).
#[derive(Debug)]
pub struct CsvLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for CsvLedger {
    fn append(&self, row: &LedgerRow) -> Result<(), LedgerError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;
        write_row(file, row, needs_header)?;
        if needs_header {
            info!(
                path = %self.path.display(),
                vocabulary_version = NUTRIENT_VOCABULARY_VERSION,
                "started ledger"
            );
        }

        debug!(path = %self.path.display(), needs_header, "appended ledger row");
        Ok(())
    }
}
