//! Load balancer fleet simulator
//!
//! Simulates a load-balanced backend fleet: synthetic per-pod traffic
//! metrics, an autoscaling control loop over a virtual pod pool, balance
//! scoring, and time-bounded failure injections, exposed over HTTP.

use anyhow::Result;
use sim_lib::{
    health::{components, HealthRegistry},
    observability::{SimulatorMetrics, StructuredLogger},
    ClusterSimulator,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SIMULATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current unix time as fractional seconds
fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting lb-simulator");

    // Load configuration
    let config = config::SimulatorConfig::load()?;
    info!(cluster = %config.cluster_name, port = config.api_port, "Simulator configured");

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::SIMULATOR).await;
    health_registry.register(components::API).await;

    // Initialize metrics
    let metrics = SimulatorMetrics::new();

    // Initialize structured logger
    let logger = StructuredLogger::new(&config.cluster_name);
    logger.log_startup(SIMULATOR_VERSION);

    // Build the simulated cluster
    let mut builder = ClusterSimulator::builder()
        .cluster_name(&config.cluster_name)
        .autoscaler_config(config.autoscaler_config())
        .history_capacity(config.history_capacity);
    if let Some(seed) = config.sampler_seed {
        builder = builder.seed(seed);
    }
    let simulator = Arc::new(Mutex::new(builder.build(now_secs())));

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        simulator,
        health_registry.clone(),
        metrics.clone(),
    ));

    // Mark as ready after initialization
    health_registry.set_ready(true).await;

    // Start the API server
    let _api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
