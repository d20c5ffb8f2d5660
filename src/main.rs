mod app_state;
mod config;
mod models;
mod routes;
mod services;

use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::{lookup::LtaVrlClient, rate_limit::CooldownGate};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing vehicle-check server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("bot_commands_total", "Total bot commands handled, by command");
    metrics::describe_counter!(
        "vehicle_checks_rate_limited_total",
        "Check requests rejected by the per-user cooldown gate"
    );
    metrics::describe_counter!(
        "plate_validation_failures_total",
        "Check requests rejected by the plate validator"
    );
    metrics::describe_counter!(
        "vehicle_lookups_total",
        "Road-tax enquiries dispatched, by resulting status"
    );
    metrics::describe_histogram!(
        "vehicle_lookup_seconds",
        "Time spent on one road-tax enquiry"
    );

    // Initialize the enquiry portal client
    tracing::info!(portal = %config.portal_base_url, "Initializing road-tax enquiry client");
    let lookup = LtaVrlClient::new(
        &config.portal_base_url,
        Duration::from_secs(config.lookup_timeout_secs),
    )
    .expect("Failed to initialize enquiry client");

    // Initialize the per-user cooldown gate
    let gate = CooldownGate::new(Duration::from_secs(config.user_cooldown_secs));

    // Create shared application state
    let state = AppState::new(gate, Arc::new(lookup));

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/webhook", post(routes::webhook::receive_update))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(64 * 1024)); // chat updates are small

    tracing::info!("Starting vehicle-check on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
