//! Integration tests for the simulator API endpoints

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sim_lib::{
    health::components, ClusterSimulator, ComponentStatus, FailureKind, FailureSeverity,
    HealthRegistry, LoadBalancingAlgorithm, SimError,
};
use tokio::sync::Mutex;
use tower::ServiceExt;

const MAX_WINDOW_MINUTES: i64 = 60;

#[derive(Clone)]
struct AppState {
    simulator: Arc<Mutex<ClusterSimulator>>,
    health_registry: HealthRegistry,
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;
    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut sim = state.simulator.lock().await;
    Json(sim.sample(now_secs()))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    minutes: Option<i64>,
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    let minutes = params.minutes.unwrap_or(5);
    if !(1..=MAX_WINDOW_MINUTES).contains(&minutes) {
        let err = SimError::InvalidWindow {
            requested: minutes,
            max_minutes: MAX_WINDOW_MINUTES,
        };
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": err.to_string() })),
        );
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

async fn inject_failure(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FailureRequest>,
) -> impl IntoResponse {
    if !(1..=3600).contains(&request.duration) {
        let err = SimError::InvalidDuration {
            requested: request.duration,
            min_secs: 1,
            max_secs: 3600,
        };
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": err.to_string() })),
        );
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
            "message": format!("{} failure injected for {}s", injection.kind, request.duration),
            "failure_injection": injection,
        })),
    )
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    enabled: bool,
}

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

fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/metrics", get(get_metrics))
        .route("/api/metrics/history", get(get_history))
        .route("/api/algorithm/change", post(change_algorithm))
        .route("/api/failure/inject", post(inject_failure))
        .route("/api/autoscaling/toggle", post(toggle_auto_scaling))
        .with_state(state)
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::SIMULATOR).await;
    health_registry.register(components::API).await;

    let simulator = Arc::new(Mutex::new(
        ClusterSimulator::builder().seed(42).build(now_secs()),
    ));
    let state = Arc::new(AppState {
        simulator,
        health_registry,
    });
    let router = create_test_router(state.clone());

    (router, state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["simulator"].is_object());
}

#[tokio::test]
async fn test_get_metrics_returns_snapshot() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body_json(response).await;

    assert_eq!(snapshot["pod_count"], 3);
    assert_eq!(snapshot["pods"].as_array().unwrap().len(), 3);
    assert_eq!(snapshot["algorithm"], "round_robin");
    assert_eq!(snapshot["scaling_status"]["min_pods"], 2);
    assert_eq!(snapshot["scaling_status"]["max_pods"], 10);
    assert!(snapshot["failure_injection"].is_null());
}

#[tokio::test]
async fn test_history_returns_sampled_snapshots() {
    let (app, state) = setup_test_app().await;

    // Drive a few cycles directly
    {
        let mut sim = state.simulator.lock().await;
        for _ in 0..3 {
            sim.sample(now_secs());
        }
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/metrics/history?minutes=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["historical_metrics"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_history_rejects_out_of_range_window() {
    for minutes in ["0", "61", "-5"] {
        let (app, _state) = setup_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/metrics/history?minutes={minutes}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("60"));
    }
}

#[tokio::test]
async fn test_change_algorithm_success() {
    let (app, state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/algorithm/change")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"algorithm": "least_connections"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["algorithm"], "least_connections");

    let sim = state.simulator.lock().await;
    assert_eq!(
        sim.algorithm(),
        LoadBalancingAlgorithm::LeastConnections
    );
}

#[tokio::test]
async fn test_change_algorithm_rejects_unknown() {
    let (app, state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/algorithm/change")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"algorithm": "fastest_pod"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("fastest_pod"));
    assert_eq!(
        body["valid_algorithms"].as_array().unwrap().len(),
        LoadBalancingAlgorithm::VALID_NAMES.len()
    );

    // State unchanged
    let sim = state.simulator.lock().await;
    assert_eq!(sim.algorithm(), LoadBalancingAlgorithm::RoundRobin);
}

#[tokio::test]
async fn test_inject_failure_success() {
    let (app, state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/failure/inject")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"type": "latency", "severity": "high", "duration": 60}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["failure_injection"]["type"], "latency");
    assert_eq!(body["failure_injection"]["severity"], "high");

    let sim = state.simulator.lock().await;
    assert!(sim.active_failure().is_some());
}

#[tokio::test]
async fn test_inject_failure_rejects_bad_duration() {
    for duration in [0, 3601] {
        let (app, state) = setup_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/failure/inject")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"type": "error", "severity": "low", "duration": {duration}}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);

        // Rejected before touching the core
        let sim = state.simulator.lock().await;
        assert!(sim.active_failure().is_none());
    }
}

#[tokio::test]
async fn test_toggle_auto_scaling() {
    let (app, state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/autoscaling/toggle")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"enabled": false}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["enabled"], false);
    assert_eq!(body["config"]["min_pods"], 2);
    assert_eq!(body["config"]["max_pods"], 10);
    assert_eq!(body["config"]["current_pods"], 3);
    assert_eq!(body["message"], "Dynamic pod scaling disabled");

    let sim = state.simulator.lock().await;
    assert!(!sim.scaling_status().auto_scaling_enabled);
}
