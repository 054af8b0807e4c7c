use crate::config::ConfigError;
use crate::ledger::LedgerError;
use crate::scans::{ExtractorError, RepositoryError, ScanServiceError};
use crate::scoring::NutritionScoringError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Scoring(NutritionScoringError),
    Extractor(ExtractorError),
    Ledger(LedgerError),
    Profiles(RepositoryError),
    Scan(ScanServiceError),
    Json(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Extractor(err) => write!(f, "label extraction error: {}", err),
            AppError::Ledger(err) => write!(f, "ledger error: {}", err),
            AppError::Profiles(err) => write!(f, "profile store error: {}", err),
            AppError::Scan(err) => write!(f, "scan error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Extractor(err) => Some(err),
            AppError::Ledger(err) => Some(err),
            AppError::Profiles(err) => Some(err),
            AppError::Scan(err) => Some(err),
            AppError::Json(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Scoring(_)
            | AppError::Json(_)
            | AppError::Extractor(ExtractorError::UnsafePath { .. }) => StatusCode::BAD_REQUEST,
            AppError::Extractor(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Scan(ScanServiceError::ProfileNotFound(_))
            | AppError::Scan(ScanServiceError::HistoryEntryNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Scan(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Ledger(_)
            | AppError::Profiles(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<NutritionScoringError> for AppError {
    fn from(value: NutritionScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<ExtractorError> for AppError {
    fn from(value: ExtractorError) -> Self {
        Self::Extractor(value)
    }
}

impl From<LedgerError> for AppError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Profiles(value)
    }
}

impl From<ScanServiceError> for AppError {
    fn from(value: ScanServiceError) -> Self {
        Self::Scan(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
