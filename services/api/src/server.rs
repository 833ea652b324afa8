use crate::cli::{DataArgs, ServeArgs};
use crate::infra::{load_state, AppState};
use crate::routes::with_project_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use copro_elevator::config::AppConfig;
use copro_elevator::error::AppError;
use copro_elevator::{telemetry, ProjectRules};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs, data_args: DataArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    data_args.apply(&mut config);

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let state = load_state(&config.data, ProjectRules::default())?;

    let app = with_project_routes(state.project, state.votes)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.data.data_dir.display(),
        "elevator project service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
