use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{NewHistoryEntry, ScanRequest, UserId};
use super::extractor::{ExtractorError, NutrientExtractor};
use super::repository::{HistoryRepository, ProfileRepository};
use super::service::{ScanService, ScanServiceError};
use crate::ledger::LedgerStore;

/// Router builder exposing scan, profile, and history endpoints.
pub fn scan_router<P, H, L, X>(service: Arc<ScanService<P, H, L, X>>) -> Router
where
    P: ProfileRepository + 'static,
    H: HistoryRepository + 'static,
    L: LedgerStore + 'static,
    X: NutrientExtractor + 'static,
{
    Router::new()
        .route("/api/v1/scans", post(scan_handler::<P, H, L, X>))
        .route(
            "/api/v1/users/:user_id/profile",
            get(profile_handler::<P, H, L, X>),
        )
        .route("/api/v1/history", post(save_history_handler::<P, H, L, X>))
        .route(
            "/api/v1/users/:user_id/history",
            get(list_history_handler::<P, H, L, X>),
        )
        .route(
            "/api/v1/history/delete",
            post(delete_history_handler::<P, H, L, X>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteEntryRequest {
    #[serde(alias = "userId")]
    pub(crate) user_id: UserId,
    #[serde(alias = "entryId")]
    pub(crate) entry_id: String,
}

pub(crate) fn error_response(error: ScanServiceError) -> Response {
    let status = match &error {
        ScanServiceError::ProfileNotFound(_) | ScanServiceError::HistoryEntryNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ScanServiceError::Extractor(ExtractorError::UnsafePath { .. }) => StatusCode::BAD_REQUEST,
        ScanServiceError::Extractor(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ScanServiceError::Scoring(_)
        | ScanServiceError::MissingInput
        | ScanServiceError::InvalidHistoryEntry(_)
        | ScanServiceError::InvalidEntryId(_) => StatusCode::BAD_REQUEST,
        ScanServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn scan_handler<P, H, L, X>(
    State(service): State<Arc<ScanService<P, H, L, X>>>,
    axum::Json(request): axum::Json<ScanRequest>,
) -> Response
where
    P: ProfileRepository + 'static,
    H: HistoryRepository + 'static,
    L: LedgerStore + 'static,
    X: NutrientExtractor + 'static,
{
    match service.submit(request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn profile_handler<P, H, L, X>(
    State(service): State<Arc<ScanService<P, H, L, X>>>,
    Path(user_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    H: HistoryRepository + 'static,
    L: LedgerStore + 'static,
    X: NutrientExtractor + 'static,
{
    match service.profile(&UserId(user_id)) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_history_handler<P, H, L, X>(
    State(service): State<Arc<ScanService<P, H, L, X>>>,
    axum::Json(entry): axum::Json<NewHistoryEntry>,
) -> Response
where
    P: ProfileRepository + 'static,
    H: HistoryRepository + 'static,
    L: LedgerStore + 'static,
    X: NutrientExtractor + 'static,
{
    match service.record_history(entry) {
        Ok(stored) => {
            let payload = json!({
                "message": "history entry saved",
                "entry_id": stored.entry_id(),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_history_handler<P, H, L, X>(
    State(service): State<Arc<ScanService<P, H, L, X>>>,
    Path(user_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    H: HistoryRepository + 'static,
    L: LedgerStore + 'static,
    X: NutrientExtractor + 'static,
{
    match service.history(&UserId(user_id)) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_history_handler<P, H, L, X>(
    State(service): State<Arc<ScanService<P, H, L, X>>>,
    axum::Json(request): axum::Json<DeleteEntryRequest>,
) -> Response
where
    P: ProfileRepository + 'static,
    H: HistoryRepository + 'static,
    L: LedgerStore + 'static,
    X: NutrientExtractor + 'static,
{
    match service.delete_history(&request.user_id, &request.entry_id) {
        Ok(()) => {
            let payload = json!({ "message": "history entry deleted" });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
