//! Observability infrastructure for the cluster simulator
//!
//! Provides:
//! - Prometheus metrics (sampling latency, pod count, scale events, history depth)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_gauge, Gauge,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SimulatorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct SimulatorMetricsInner {
    sampling_latency_seconds: Histogram,
    sampling_cycles: IntCounter,
    pod_count: IntGauge,
    scale_ups: IntCounter,
    scale_downs: IntCounter,
    history_entries: IntGauge,
    balance_score: Gauge,
    failure_injections: IntCounter,
    active_failure: IntGauge,
    imbalance_alerts: IntCounter,
}

impl SimulatorMetricsInner {
    fn new() -> Self {
        Self {
            sampling_latency_seconds: register_histogram!(
                "lb_simulator_sampling_latency_seconds",
                "Time spent composing one cluster snapshot",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register sampling_latency_seconds"),

            sampling_cycles: register_int_counter!(
                "lb_simulator_sampling_cycles_total",
                "Total number of sampling cycles performed"
            )
            .expect("Failed to register sampling_cycles_total"),

            pod_count: register_int_gauge!(
                "lb_simulator_pod_count",
                "Current number of virtual pods in the simulated pool"
            )
            .expect("Failed to register pod_count"),

            scale_ups: register_int_counter!(
                "lb_simulator_scale_ups_total",
                "Total number of scale-up actions taken"
            )
            .expect("Failed to register scale_ups_total"),

            scale_downs: register_int_counter!(
                "lb_simulator_scale_downs_total",
                "Total number of scale-down actions taken"
            )
            .expect("Failed to register scale_downs_total"),

            history_entries: register_int_gauge!(
                "lb_simulator_history_entries",
                "Number of snapshots in the historical retention buffer"
            )
            .expect("Failed to register history_entries"),

            balance_score: register_gauge!(
                "lb_simulator_balance_score",
                "Most recently computed balance score"
            )
            .expect("Failed to register balance_score"),

            failure_injections: register_int_counter!(
                "lb_simulator_failure_injections_total",
                "Total number of failure injections requested"
            )
            .expect("Failed to register failure_injections_total"),

            active_failure: register_int_gauge!(
                "lb_simulator_active_failure",
                "Whether a failure injection is currently active (0 or 1)"
            )
            .expect("Failed to register active_failure"),

            imbalance_alerts: register_int_counter!(
                "lb_simulator_imbalance_alerts_total",
                "Total number of imbalance alerts raised"
            )
            .expect("Failed to register imbalance_alerts_total"),
        }
    }
}

/// Simulator metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct SimulatorMetrics {
    _private: (),
}

impl Default for SimulatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SimulatorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SimulatorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record a sampling latency observation
    pub fn observe_sampling_latency(&self, duration_secs: f64) {
        self.inner().sampling_latency_seconds.observe(duration_secs);
    }

    /// Count one completed sampling cycle
    pub fn inc_sampling_cycles(&self) {
        self.inner().sampling_cycles.inc();
    }

    /// Update the current pod count gauge
    pub fn set_pod_count(&self, count: i64) {
        self.inner().pod_count.set(count);
    }

    /// Count a scale-up action
    pub fn inc_scale_ups(&self) {
        self.inner().scale_ups.inc();
    }

    /// Count a scale-down action
    pub fn inc_scale_downs(&self) {
        self.inner().scale_downs.inc();
    }

    /// Update the history buffer depth gauge
    pub fn set_history_entries(&self, entries: i64) {
        self.inner().history_entries.set(entries);
    }

    /// Record the most recent balance score
    pub fn set_balance_score(&self, score: f64) {
        self.inner().balance_score.set(score);
    }

    /// Count one failure injection request
    pub fn inc_failure_injections(&self) {
        self.inner().failure_injections.inc();
    }

    /// Update the active-failure gauge
    pub fn set_active_failure(&self, active: bool) {
        self.inner().active_failure.set(if active { 1 } else { 0 });
    }

    /// Count one raised imbalance alert
    pub fn inc_imbalance_alerts(&self) {
        self.inner().imbalance_alerts.inc();
    }
}

/// Structured logger for simulator events
///
/// Provides consistent JSON-formatted logging for scaling actions,
/// failure lifecycle transitions, and configuration changes.
#[derive(Clone)]
pub struct StructuredLogger {
    cluster_name: String,
}

impl StructuredLogger {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
        }
    }

    /// Log a scaling action
    pub fn log_scale_event(&self, direction: &str, from_pods: u32, to_pods: u32, avg_load: f64) {
        info!(
            event = "pool_scaled",
            cluster = %self.cluster_name,
            direction = %direction,
            from_pods = from_pods,
            to_pods = to_pods,
            avg_load_per_pod = avg_load,
            "Pod pool scaled"
        );
    }

    /// Log a failure injection
    pub fn log_failure_injected(&self, kind: &str, severity: &str, duration_secs: f64) {
        warn!(
            event = "failure_injected",
            cluster = %self.cluster_name,
            kind = %kind,
            severity = %severity,
            duration_secs = duration_secs,
            "Failure injection activated"
        );
    }

    /// Log a failure expiry
    pub fn log_failure_expired(&self, kind: &str) {
        info!(
            event = "failure_expired",
            cluster = %self.cluster_name,
            kind = %kind,
            "Failure injection expired"
        );
    }

    /// Log a load balancing algorithm change
    pub fn log_algorithm_change(&self, algorithm: &str) {
        info!(
            event = "algorithm_changed",
            cluster = %self.cluster_name,
            algorithm = %algorithm,
            "Load balancing algorithm changed"
        );
    }

    /// Log an autoscaling toggle
    pub fn log_auto_scaling_toggled(&self, enabled: bool, current_pods: u32) {
        info!(
            event = "auto_scaling_toggled",
            cluster = %self.cluster_name,
            enabled = enabled,
            current_pods = current_pods,
            "Auto-scaling toggled"
        );
    }

    /// Log simulator startup
    pub fn log_startup(&self, version: &str) {
        info!(
            event = "simulator_started",
            cluster = %self.cluster_name,
            version = %version,
            "Cluster simulator started"
        );
    }

    /// Log simulator shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "simulator_shutdown",
            cluster = %self.cluster_name,
            reason = %reason,
            "Cluster simulator shutting down"
        );
    }
}
