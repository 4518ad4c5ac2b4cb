use crate::cli::ServeArgs;
use crate::infra::{seed_directory, AppState, InMemoryDirectory, InMemoryReviewRepository};
use crate::routes::with_review_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use peer_review::config::AppConfig;
use peer_review::error::AppError;
use peer_review::reviews::ReviewService;
use peer_review::telemetry;
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

    let review_service = Arc::new(ReviewService::new(
        Arc::new(InMemoryReviewRepository::default()),
        Arc::new(InMemoryDirectory::default()),
    ));

    if config.directory.seed_demo {
        let employees = seed_directory(&review_service)?;
        let admins: Vec<String> = employees
            .iter()
            .filter(|employee| employee.is_admin())
            .map(|employee| employee.id.to_string())
            .collect();
        info!(employees = employees.len(), ?admins, "seeded demo directory");
    }

    let app = with_review_routes(review_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "peer review service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
