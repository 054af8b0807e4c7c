use std::io::Read;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::scoring::{Nutrient, NutrientReading, ReadingError};

/// Turns a photographed nutrition label into per-100g quantities.
pub trait NutrientExtractor: Send + Sync {
    fn extract(&self, image: &Path) -> Result<NutrientReading, ExtractorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error("failed to read label table {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid label table: {0}")]
    Csv(#[from] csv::Error),
    #[error("label row {row} is malformed: expected `name,value`")]
    MalformedRow { row: usize },
    #[error("label value for {name} is not a number: '{value}'")]
    InvalidValue { name: String, value: String },
    #[error(transparent)]
    Reading(#[from] ReadingError),
    #[error("no recognised nutrients on the label")]
    NoNutrients,
    #[error("image path {path} must be relative to the upload directory")]
    UnsafePath { path: PathBuf },
}

/// Parse a two-column `name,value` table of per-100g quantities.
///
/// Names outside the nutrient vocabulary are skipped. A name repeated later in the
/// table overrides the earlier value.
pub fn parse_label_table<R: Read>(reader: R) -> Result<NutrientReading, ExtractorError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut reading = NutrientReading::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let (Some(name), Some(value)) = (record.get(0), record.get(1)) else {
            return Err(ExtractorError::MalformedRow { row: index + 1 });
        };

        let Ok(nutrient) = name.parse::<Nutrient>() else {
            debug!(name, "skipping unrecognised label row");
            continue;
        };
        let quantity = value
            .parse::<f64>()
            .map_err(|_| ExtractorError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            })?;
        reading.insert(nutrient, quantity)?;
    }

    if reading.is_empty() {
        return Err(ExtractorError::NoNutrients);
    }
    Ok(reading)
}

/// Reads the table the label recognizer leaves next to each image (`<image>.csv`).
///
/// Image paths are resolved inside `upload_dir`. Absolute paths and paths that climb
/// out with `..` are refused before anything is opened.
#[derive(Debug, Clone)]
pub struct LabelTableExtractor {
    upload_dir: PathBuf,
}

impl LabelTableExtractor {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn table_path(&self, image: &Path) -> Result<PathBuf, ExtractorError> {
        let confined = image
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if image.as_os_str().is_empty() || !confined {
            return Err(ExtractorError::UnsafePath {
                path: image.to_path_buf(),
            });
        }
        Ok(self.upload_dir.join(image).with_extension("csv"))
    }
}

impl NutrientExtractor for LabelTableExtractor {
    fn extract(&self, image: &Path) -> Result<NutrientReading, ExtractorError> {
        let path = self.table_path(image)?;
        let file = std::fs::File::open(&path).map_err(|source| ExtractorError::Io {
            path: path.clone(),
            source,
        })?;
        parse_label_table(file)
    }
}
