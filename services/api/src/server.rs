use crate::cli::ServeArgs;
use crate::infra::{
    ApiScanService, AppState, InMemoryHistoryRepository, InMemoryProfileRepository,
};
use crate::routes::with_scan_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use nutrilens::config::AppConfig;
use nutrilens::error::AppError;
use nutrilens::ledger::CsvLedger;
use nutrilens::scans::{LabelTableExtractor, ScanService};
use nutrilens::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let profiles = match &config.storage.profiles_path {
        Some(path) => InMemoryProfileRepository::from_path(path)?,
        None => {
            warn!("APP_PROFILES_PATH not set; every scan will report an unknown profile");
            InMemoryProfileRepository::default()
        }
    };
    let ledger = CsvLedger::new(&config.storage.ledger_path);
    let extractor = LabelTableExtractor::new(&config.storage.upload_dir);
    let scan_service: Arc<ApiScanService> = Arc::new(
        ScanService::new(
            Arc::new(profiles),
            Arc::new(InMemoryHistoryRepository::default()),
            Arc::new(ledger),
            Arc::new(extractor),
        )
        .with_default_weight(config.scoring.default_weight_grams),
    );

    let app = with_scan_routes(scan_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        ledger = %config.storage.ledger_path.display(),
        upload_dir = %config.storage.upload_dir.display(),
        default_weight_grams = config.scoring.default_weight_grams,
        "nutrilens scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
