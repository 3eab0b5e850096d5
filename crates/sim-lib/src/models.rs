//! Core data models for the cluster simulator

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Health status of a simulated backend pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Pod is passing health checks
    Healthy,
    /// Pod has accumulated too many health-check failures
    Degraded,
}

/// Metrics for a single virtual backend pod at one sampling instant
///
/// Created fresh on every sampling call and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodMetric {
    pub name: String,
    pub requests: u64,
    pub successful_requests: u64,
    pub errors_4xx: u64,
    pub errors_5xx: u64,
    pub total_errors: u64,
    pub response_time_ms: f64,
    pub response_time_p50: f64,
    pub response_time_p90: f64,
    pub response_time_p95: f64,
    pub response_time_p99: f64,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub error_rate: f64,
    pub active_connections: u64,
    pub health_status: HealthStatus,
    pub health_check_failures: u32,
    pub last_health_check: f64,
    pub throughput_rps: f64,
}

/// Autoscaling summary attached to every snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingStatus {
    pub current_pods: u32,
    pub min_pods: u32,
    pub max_pods: u32,
    pub avg_load_per_pod: f64,
    pub auto_scaling_enabled: bool,
}

/// Kind of simulated failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Latency,
    Error,
    PodFailure,
    NetworkPartition,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Latency => write!(f, "latency"),
            FailureKind::Error => write!(f, "error"),
            FailureKind::PodFailure => write!(f, "pod_failure"),
            FailureKind::NetworkPartition => write!(f, "network_partition"),
        }
    }
}

/// Severity of a simulated failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureSeverity {
    Low,
    Medium,
    High,
}

impl FailureSeverity {
    /// Latency a richer metrics source would add for this severity
    pub fn latency_ms(&self) -> u64 {
        match self {
            FailureSeverity::Low => 50,
            FailureSeverity::Medium => 200,
            FailureSeverity::High => 1000,
        }
    }

    /// Error rate a richer metrics source would inject for this severity
    pub fn error_rate(&self) -> f64 {
        match self {
            FailureSeverity::Low => 0.05,
            FailureSeverity::Medium => 0.15,
            FailureSeverity::High => 0.50,
        }
    }
}

impl std::fmt::Display for FailureSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureSeverity::Low => write!(f, "low"),
            FailureSeverity::Medium => write!(f, "medium"),
            FailureSeverity::High => write!(f, "high"),
        }
    }
}

/// Time-bounded failure descriptor attached to cluster state
///
/// At most one is active at a time; once `now - start_time >= duration_secs`
/// it is cleared on the next sampling cycle (lazy expiry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInjection {
    #[serde(rename = "type")]
    pub kind: FailureKind,
    pub severity: FailureSeverity,
    pub duration_secs: f64,
    pub start_time: f64,
    pub end_time: f64,
}

impl FailureInjection {
    /// Whether this injection has run past its duration at `now`
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.start_time >= self.duration_secs
    }

    /// Human-readable description of the injected effect
    pub fn describe(&self) -> String {
        match self.kind {
            FailureKind::Latency => {
                format!("Injected {}ms latency", self.severity.latency_ms())
            }
            FailureKind::Error => {
                format!(
                    "Injected {:.0}% error rate",
                    self.severity.error_rate() * 100.0
                )
            }
            FailureKind::PodFailure => {
                format!("Simulated pod failure for {:.0}s", self.duration_secs)
            }
            FailureKind::NetworkPartition => {
                format!("Simulated network partition for {:.0}s", self.duration_secs)
            }
        }
    }
}

/// Load balancing algorithm configured on the simulated cluster
///
/// Selection is a pure configuration value: it is attached to every
/// snapshot but does not change how metrics are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancingAlgorithm {
    RoundRobin,
    LeastConnections,
    IpHash,
    WeightedRoundRobin,
    LeastResponseTime,
}

impl LoadBalancingAlgorithm {
    /// Valid algorithm names, in the order they are advertised to clients
    pub const VALID_NAMES: &'static [&'static str] = &[
        "round_robin",
        "least_connections",
        "ip_hash",
        "weighted_round_robin",
        "least_response_time",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadBalancingAlgorithm::RoundRobin => "round_robin",
            LoadBalancingAlgorithm::LeastConnections => "least_connections",
            LoadBalancingAlgorithm::IpHash => "ip_hash",
            LoadBalancingAlgorithm::WeightedRoundRobin => "weighted_round_robin",
            LoadBalancingAlgorithm::LeastResponseTime => "least_response_time",
        }
    }
}

impl std::str::FromStr for LoadBalancingAlgorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(LoadBalancingAlgorithm::RoundRobin),
            "least_connections" => Ok(LoadBalancingAlgorithm::LeastConnections),
            "ip_hash" => Ok(LoadBalancingAlgorithm::IpHash),
            "weighted_round_robin" => Ok(LoadBalancingAlgorithm::WeightedRoundRobin),
            "least_response_time" => Ok(LoadBalancingAlgorithm::LeastResponseTime),
            other => Err(SimError::UnknownAlgorithm {
                requested: other.to_string(),
                valid: Self::VALID_NAMES,
            }),
        }
    }
}

impl std::fmt::Display for LoadBalancingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One full, immutable sampling result for the whole simulated cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub pods: Vec<PodMetric>,
    pub total_requests: u64,
    pub total_errors_4xx: u64,
    pub total_errors_5xx: u64,
    pub timestamp: f64,
    pub algorithm: LoadBalancingAlgorithm,
    pub health_check_interval: u32,
    pub pod_count: u32,
    pub scaling_status: ScalingStatus,
    pub failure_injection: Option<FailureInjection>,
}

/// Per-pod projection retained in history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPod {
    pub name: String,
    pub requests: u64,
    pub response_time_ms: f64,
    pub error_rate: f64,
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

/// Simplified projection of a snapshot, retained for trend queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalSnapshot {
    pub timestamp: f64,
    pub pod_count: u32,
    pub total_requests: u64,
    pub pods: Vec<HistoricalPod>,
}

impl From<&ClusterSnapshot> for HistoricalSnapshot {
    fn from(snapshot: &ClusterSnapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            pod_count: snapshot.pod_count,
            total_requests: snapshot.total_requests,
            pods: snapshot
                .pods
                .iter()
                .map(|pod| HistoricalPod {
                    name: pod.name.clone(),
                    requests: pod.requests,
                    response_time_ms: pod.response_time_ms,
                    error_rate: pod.error_rate,
                    cpu_usage: pod.cpu_usage,
                    memory_usage: pod.memory_usage,
                })
                .collect(),
        }
    }
}
