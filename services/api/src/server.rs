use crate::cli::ServeArgs;
use crate::infra::{build_coach, load_catalog, AppState, InMemorySessionStore};
use crate::routes::with_advisor_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use youth_policy::advisor::PolicyAdvisorService;
use youth_policy::config::AppConfig;
use youth_policy::error::AppError;
use youth_policy::telemetry::{self, LogOutput};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogOutput::Service)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(load_catalog(config.catalog.path.as_deref()));
    let coach = build_coach(&config.assistant)?;
    let assistant_enabled = coach.assistant_available();
    let sessions = Arc::new(InMemorySessionStore::default());
    let advisor_service = Arc::new(PolicyAdvisorService::new(catalog.clone(), coach, sessions));

    let app = with_advisor_routes(advisor_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        programs = catalog.len(),
        assistant_enabled,
        "youth policy advisor ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
