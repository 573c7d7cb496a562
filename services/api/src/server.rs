use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCorrectiveActionRepository, InMemoryEmployeeDirectory};
use crate::routes::with_discipline_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use care_portal::config::AppConfig;
use care_portal::error::AppError;
use care_portal::telemetry;
use care_portal::workflows::discipline::{CorrectiveActionService, ViolationCatalog};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let catalog = ViolationCatalog::seeded();
    let policy = config.discipline.policy();
    info!(
        categories = catalog.len(),
        window_days = policy.window_days,
        min_incident_chars = policy.min_incident_chars,
        "discipline policy loaded"
    );

    let service = Arc::new(CorrectiveActionService::new(
        Arc::new(InMemoryCorrectiveActionRepository::default()),
        Arc::new(InMemoryEmployeeDirectory::demo_staff()),
        Arc::new(catalog),
        policy,
    ));

    let app = with_discipline_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "care portal discipline service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
