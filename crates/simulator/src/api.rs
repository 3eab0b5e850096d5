//! HTTP API exposing the cluster simulator, health checks, and metrics

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use sim_lib::{
    BalanceAnalyzer, ClusterSimulator, ComponentStatus, FailureKind, FailureSeverity,
    HealthRegistry, LoadBalancingAlgorithm, SimError, SimulatorMetrics,
};
use tokio::sync::Mutex;
use tracing::info;

/// Largest history window clients may request (minutes)
const MAX_WINDOW_MINUTES: i64 = 60;

/// Default history window when none is given (minutes)
const DEFAULT_WINDOW_MINUTES: i64 = 5;

/// Failure duration bounds accepted at this boundary (seconds)
const MIN_FAILURE_SECS: i64 = 1;
const MAX_FAILURE_SECS: i64 = 3600;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<Mutex<ClusterSimulator>>,
    pub analyzer: BalanceAnalyzer,
    pub health_registry: HealthRegistry,
    pub metrics: SimulatorMetrics,
}

impl AppState {
    pub fn new(
        simulator: Arc<Mutex<ClusterSimulator>>,
        health_registry: HealthRegistry,
        metrics: SimulatorMetrics,
    ) -> Self {
        Self {
            simulator,
            analyzer: BalanceAnalyzer::default(),
            health_registry,
            metrics,
        }
    }
}

/// Current unix time as fractional seconds
fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

fn validation_error(err: SimError) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": err.to_string() })),
    )
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Run one sampling cycle and return the composed snapshot
async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut sim = state.simulator.lock().await;
    let snapshot = sim.sample(now_secs());
    Json(snapshot)
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    minutes: Option<i64>,
}

/// Historical snapshots within the requested recency window
async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    let minutes = params.minutes.unwrap_or(DEFAULT_WINDOW_MINUTES);
    if !(1..=MAX_WINDOW_MINUTES).contains(&minutes) {
        return validation_error(SimError::InvalidWindow {
            requested: minutes,
            max_minutes: MAX_WINDOW_MINUTES,
        });
    }

    let sim = state.simulator.lock().await;
    let history = sim.history(Duration::from_secs(minutes as u64 * 60), now_secs());

    (
        StatusCode::OK,
        Json(json!({ "historical_metrics": history })),
    )
}

#[derive(Debug, Deserialize)]
struct AlgorithmRequest {
    algorithm: String,
}

/// Change the load balancing algorithm
async fn change_algorithm(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AlgorithmRequest>,
) -> impl IntoResponse {
    let mut sim = state.simulator.lock().await;

    match sim.set_algorithm(&request.algorithm) {
        Ok(algorithm) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "algorithm": algorithm,
                "message": format!("Load balancing algorithm changed to {algorithm}"),
            })),
        ),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": err.to_string(),
                "valid_algorithms": LoadBalancingAlgorithm::VALID_NAMES,
            })),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct FailureRequest {
    #[serde(rename = "type")]
    kind: FailureKind,
    severity: FailureSeverity,
    duration: i64,
}

/// Inject a time-bounded failure
async fn inject_failure(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FailureRequest>,
) -> impl IntoResponse {
    if !(MIN_FAILURE_SECS..=MAX_FAILURE_SECS).contains(&request.duration) {
        return validation_error(SimError::InvalidDuration {
            requested: request.duration,
            min_secs: MIN_FAILURE_SECS,
            max_secs: MAX_FAILURE_SECS,
        });
    }

    let mut sim = state.simulator.lock().await;
    let injection = sim.inject_failure(
        request.kind,
        request.severity,
        request.duration as f64,
        now_secs(),
    );

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": format!(
                "{} failure injected for {}s",
                injection.kind, request.duration
            ),
            "failure_injection": injection,
        })),
    )
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    enabled: bool,
}

/// Enable or disable autoscaling
async fn toggle_auto_scaling(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToggleRequest>,
) -> impl IntoResponse {
    let mut sim = state.simulator.lock().await;
    let status = sim.set_auto_scaling(request.enabled);

    let verb = if request.enabled { "enabled" } else { "disabled" };
    Json(json!({
        "success": true,
        "enabled": request.enabled,
        "config": {
            "min_pods": status.min_pods,
            "max_pods": status.max_pods,
            "current_pods": status.current_pods,
        },
        "message": format!("Dynamic pod scaling {verb}"),
    }))
}

/// Run a cycle and score its balance
async fn get_balance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = {
        let mut sim = state.simulator.lock().await;
        sim.sample(now_secs())
    };

    let score = state.analyzer.balance_score(&snapshot);
    let alert = state.analyzer.detect_imbalance(&snapshot);

    state.metrics.set_balance_score(score);
    if alert.is_some() {
        state.metrics.inc_imbalance_alerts();
    }

    Json(json!({ "balance_score": score, "alert": alert }))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/metrics", get(get_metrics))
        .route("/api/metrics/history", get(get_history))
        .route("/api/algorithm/change", post(change_algorithm))
        .route("/api/failure/inject", post(inject_failure))
        .route("/api/autoscaling/toggle", post(toggle_auto_scaling))
        .route("/api/balance", get(get_balance))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
