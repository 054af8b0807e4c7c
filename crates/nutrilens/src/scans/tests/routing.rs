use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::scans::router::{profile_handler, scan_handler, DeleteEntryRequest};
use crate::scans::{scan_router, LabelTableExtractor, ScanRequest, ScanService};

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("json")))
        .expect("request")
}

#[tokio::test]
async fn scan_handler_returns_unprocessable_for_extractor_failure() {
    let service = Arc::new(ScanService::new(
        Arc::new(MemoryProfiles::with_profile(known_user(), male_profile())),
        Arc::new(MemoryHistory::default()),
        Arc::new(MemoryLedger::default()),
        Arc::new(StubExtractor::failing()),
    ));
    let request = ScanRequest {
        user_id: known_user(),
        weight_grams: None,
        reading: None,
        image_path: Some("blurry.png".into()),
    };

    let response = scan_handler::<MemoryProfiles, MemoryHistory, MemoryLedger, StubExtractor>(
        State(service),
        axum::Json(request),
    )
    .await;

    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn scan_handler_returns_internal_error_when_profiles_unavailable() {
    let service = Arc::new(ScanService::new(
        Arc::new(UnavailableProfiles),
        Arc::new(MemoryHistory::default()),
        Arc::new(MemoryLedger::default()),
        Arc::new(StubExtractor::returning(protein_bar())),
    ));
    let request = ScanRequest {
        user_id: known_user(),
        weight_grams: Some(100.0),
        reading: Some(protein_bar()),
        image_path: None,
    };

    let response = scan_handler::<UnavailableProfiles, MemoryHistory, MemoryLedger, StubExtractor>(
        State(service),
        axum::Json(request),
    )
    .await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn scan_route_confines_image_paths_to_the_upload_dir() {
    let upload_dir =
        std::env::temp_dir().join(format!("nutrilens-uploads-{}", std::process::id()));
    std::fs::create_dir_all(&upload_dir).expect("upload dir");
    std::fs::write(upload_dir.join("bar.csv"), "PROTEINS,20\nFIBER,10\nSODIUM,400\n")
        .expect("label table written");
    let outside = std::env::temp_dir().join(format!("nutrilens-outside-{}.csv", std::process::id()));
    std::fs::write(&outside, "SUGAR,5\n").expect("outside table written");

    let service = Arc::new(ScanService::new(
        Arc::new(MemoryProfiles::with_profile(known_user(), male_profile())),
        Arc::new(MemoryHistory::default()),
        Arc::new(MemoryLedger::default()),
        Arc::new(LabelTableExtractor::new(&upload_dir)),
    ));
    let router = scan_router(service);

    let escaping = format!(
        "../{}",
        outside.with_extension("png").file_name().expect("file name").to_string_lossy()
    );
    for image_path in [outside.with_extension("png").display().to_string(), escaping] {
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/scans",
                json!({ "user_id": KNOWN_USER, "image_path": image_path }),
            ))
            .await
            .expect("route responds");
        assert_status(&response, StatusCode::BAD_REQUEST);
    }

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/scans",
            json!({ "user_id": KNOWN_USER, "weight": 150, "image_path": "bar.png" }),
        ))
        .await
        .expect("route responds");
    assert_status(&response, StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["rating"]["final_rating"], 10.0);

    let _ = std::fs::remove_file(&outside);
    let _ = std::fs::remove_dir_all(&upload_dir);
}

#[tokio::test]
async fn profile_handler_returns_not_found_for_unknown_user() {
    let (service, _, _) = build_service();

    let response = profile_handler::<MemoryProfiles, MemoryHistory, MemoryLedger, StubExtractor>(
        State(service),
        Path("ghost".to_string()),
    )
    .await;

    assert_status(&response, StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"], "no profile found for user ghost");
}

#[tokio::test]
async fn scan_route_rates_a_reading() {
    let (service, _, ledger) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/scans",
            json!({
                "userId": KNOWN_USER,
                "weight": 150,
                "reading": { "PROTEINS": 20, "FIBER": 10, "SODIUM": 400 }
            }),
        ))
        .await
        .expect("route responds");

    assert_status(&response, StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user_id"], KNOWN_USER);
    assert_eq!(body["persisted"], true);
    assert_eq!(body["rating"]["category"], "adult-male");
    assert_eq!(body["rating"]["final_rating"], 10.0);
    assert_eq!(body["rating"]["percentages"]["FIBER"], 37.5);
    assert!(body.get("ledger_error").is_none());
    assert_eq!(ledger.rows().len(), 1);
}

#[tokio::test]
async fn scan_route_rejects_negative_weight() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/scans",
            json!({ "user_id": KNOWN_USER, "weight_grams": -3, "reading": { "SUGAR": 5 } }),
        ))
        .await
        .expect("route responds");

    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_route_returns_stored_profile() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/users/{KNOWN_USER}/profile"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route responds");

    assert_status(&response, StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["age"], 34);
    assert_eq!(body["gender"], "male");
}

#[tokio::test]
async fn history_routes_save_list_and_delete() {
    let (service, history, _) = build_service();
    let router = router_with_service(service);

    let saved = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/history",
            json!({ "userId": KNOWN_USER, "name": "Oat bar", "final_rating": 6.5, "calories": 190 }),
        ))
        .await
        .expect("route responds");
    assert_status(&saved, StatusCode::CREATED);
    let entry_id = read_json(saved).await["entry_id"]
        .as_str()
        .expect("entry id")
        .to_string();
    assert!(entry_id.ends_with(" Oat bar"), "got {entry_id}");

    let listed = router
        .clone()
        .oneshot(
            Request::get(format!("/api/v1/users/{KNOWN_USER}/history"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route responds");
    assert_status(&listed, StatusCode::OK);
    let body = read_json(listed).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["name"], "Oat bar");

    let deleted = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/history/delete",
            json!({ "userId": KNOWN_USER, "entryId": entry_id }),
        ))
        .await
        .expect("route responds");
    assert_status(&deleted, StatusCode::OK);
    assert!(history.entries().is_empty());

    let missing = router
        .oneshot(json_request(
            "POST",
            "/api/v1/history/delete",
            json!({ "user_id": KNOWN_USER, "entry_id": entry_id }),
        ))
        .await
        .expect("route responds");
    assert_status(&missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_route_rejects_out_of_range_rating() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/history",
            json!({ "user_id": KNOWN_USER, "name": "Cola", "final_rating": 12 }),
        ))
        .await
        .expect("route responds");

    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[test]
fn delete_request_accepts_snake_and_camel_case() {
    let camel: DeleteEntryRequest =
        serde_json::from_value(json!({ "userId": "u", "entryId": "2024-01-01 tea" }))
            .expect("camel case parses");
    let snake: DeleteEntryRequest =
        serde_json::from_value(json!({ "user_id": "u", "entry_id": "2024-01-01 tea" }))
            .expect("snake case parses");
    assert_eq!(camel.entry_id, snake.entry_id);
    assert_eq!(camel.user_id, snake.user_id);
}
