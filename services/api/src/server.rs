use crate::cli::ServeArgs;
use crate::infra::{AppState, EngineState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use reimburse::config::AppConfig;
use reimburse::error::AppError;
use reimburse::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    if let Some(rates) = args.rates.take() {
        config.engine.rates_path = Some(rates);
    }

    telemetry::init(&config.telemetry)?;

    let engine_state = Arc::new(EngineState::load(config.engine.rates_path.as_deref())?);
    let schedule_version = engine_state.engine.schedule_version().to_string();

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_operational_routes(engine_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, %schedule_version, "reimbursement service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
