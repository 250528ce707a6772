use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    location::LocationResolver,
    metrics,
    signals::shutdown_signal,
    valuation::{ModelState, ValuationService},
};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the shared valuation service: load the model once, set up the resolver
pub fn build_service(config: &Config) -> Result<ValuationService> {
    let model = ModelState::load(&config.model.path);

    let http_client = reqwest::Client::builder()
        .user_agent(config.geocoding.user_agent.clone())
        .build()?;
    let resolver = LocationResolver::from_config(http_client, &config.geocoding);

    Ok(ValuationService::new(model, resolver))
}

/// Start the valuation API server
///
/// This function:
/// 1. Initializes metrics
/// 2. Loads the price model and builds the location resolver
/// 3. Creates the Axum application
/// 4. Binds to the configured address
/// 5. Serves requests until SIGINT/SIGTERM
pub async fn start_server(config: Config) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let service = build_service(&config)?;
    let model_ready = service.model_state().is_ready();

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let app_state = AppState::new(config, service);
    let app = create_router(app_state, metrics_handle);

    info!("Starting property valuer on {}", addr);
    info!(model_ready = model_ready, "Price model state");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(app_state: AppState, metrics_handle: Option<Arc<PrometheusHandle>>) -> Router {
    let metrics_endpoint = app_state.config.metrics.endpoint.clone();

    let api_routes = Router::new()
        .route("/ready", get(handlers::health::readiness_check))
        .route("/v1/estimate", post(handlers::estimate::create_estimate))
        .route("/v1/model", get(handlers::model_info::model_summary))
        .route(
            "/v1/neighborhoods",
            get(handlers::neighborhoods::list_neighborhoods),
        )
        .with_state(app_state);

    let mut router = Router::new().route("/health", get(handlers::health::health_check));

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route(&metrics_endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    router
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
