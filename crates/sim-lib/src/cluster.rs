//! Cluster state simulator
//!
//! The single serialized owner of all mutable simulation state: the pod
//! pool, algorithm selection, autoscaling decisions, failure-injection
//! lifecycle, and historical retention. Every mutating operation goes
//! through one `ClusterSimulator` instance; callers that need concurrent
//! access wrap it in a mutex and hold the lock for one full cycle.

use std::time::Duration;

use crate::error::SimError;
use crate::failure::FailureInjector;
use crate::history::HistoryBuffer;
use crate::models::{
    ClusterSnapshot, FailureInjection, FailureKind, FailureSeverity, HistoricalSnapshot,
    LoadBalancingAlgorithm, ScalingStatus,
};
use crate::observability::{SimulatorMetrics, StructuredLogger};
use crate::sampler::{PodMetricsSource, SamplerConfig, SyntheticSampler};
use crate::scaler::{Autoscaler, AutoscalerConfig, ScaleDirection};

/// Interval advertised to clients for pod health checks (seconds)
const HEALTH_CHECK_INTERVAL_SECS: u32 = 5;

/// The authoritative simulated cluster
pub struct ClusterSimulator {
    source: Box<dyn PodMetricsSource>,
    autoscaler: Autoscaler,
    failures: FailureInjector,
    history: HistoryBuffer,
    algorithm: LoadBalancingAlgorithm,
    last_total_requests: u64,
    metrics: SimulatorMetrics,
    logger: StructuredLogger,
}

impl ClusterSimulator {
    /// Start building a simulator
    pub fn builder() -> ClusterSimulatorBuilder {
        ClusterSimulatorBuilder::new()
    }

    /// Perform one full sampling cycle and return the composed snapshot
    ///
    /// Samples every pod, feeds the aggregate into the autoscaler (the
    /// snapshot reports the post-decision pod count), attaches any active
    /// failure injection, lazily expires a completed injection, and
    /// appends the historical projection.
    pub fn sample(&mut self, now: f64) -> ClusterSnapshot {
        let start = std::time::Instant::now();

        let pods = self.source.sample(self.autoscaler.pod_count(), now);

        let total_requests: u64 = pods.iter().map(|p| p.requests).sum();
        let total_errors_4xx: u64 = pods.iter().map(|p| p.errors_4xx).sum();
        let total_errors_5xx: u64 = pods.iter().map(|p| p.errors_5xx).sum();
        self.last_total_requests = total_requests;

        if let Some(event) = self.autoscaler.evaluate(total_requests, now) {
            match event.direction {
                ScaleDirection::Up => self.metrics.inc_scale_ups(),
                ScaleDirection::Down => self.metrics.inc_scale_downs(),
            }
            let direction = match event.direction {
                ScaleDirection::Up => "up",
                ScaleDirection::Down => "down",
            };
            self.logger.log_scale_event(
                direction,
                event.from_pods,
                event.to_pods,
                event.avg_load_per_pod,
            );
        }
        self.metrics.set_pod_count(self.autoscaler.pod_count() as i64);

        let snapshot = ClusterSnapshot {
            pods,
            total_requests,
            total_errors_4xx,
            total_errors_5xx,
            timestamp: now,
            algorithm: self.algorithm,
            health_check_interval: HEALTH_CHECK_INTERVAL_SECS,
            pod_count: self.autoscaler.pod_count(),
            scaling_status: self.autoscaler.status(total_requests),
            failure_injection: self.failures.active().cloned(),
        };

        // Expiry runs after snapshot composition: a just-expired injection
        // is still visible in the snapshot that observed its final moment.
        if let Some(expired) = self.failures.evaluate(now) {
            self.logger.log_failure_expired(expired.kind.to_string().as_str());
        }
        self.metrics
            .set_active_failure(self.failures.active().is_some());

        self.history.append(HistoricalSnapshot::from(&snapshot));
        self.metrics.set_history_entries(self.history.len() as i64);
        self.metrics.inc_sampling_cycles();
        self.metrics
            .observe_sampling_latency(start.elapsed().as_secs_f64());

        snapshot
    }

    /// Retained snapshots within the recency window, ascending by time
    ///
    /// Range validation (1..=60 minutes on the HTTP surface) is the
    /// transport layer's responsibility.
    pub fn history(&self, window: Duration, now: f64) -> Vec<HistoricalSnapshot> {
        self.history.query(window, now)
    }

    /// Change the load balancing algorithm
    ///
    /// Rejects names outside the closed enum without mutating state.
    pub fn set_algorithm(&mut self, name: &str) -> Result<LoadBalancingAlgorithm, SimError> {
        let algorithm: LoadBalancingAlgorithm = name.parse()?;
        self.algorithm = algorithm;
        self.logger.log_algorithm_change(algorithm.as_str());
        Ok(algorithm)
    }

    /// Inject a failure, overwriting any active one (last-write-wins)
    pub fn inject_failure(
        &mut self,
        kind: FailureKind,
        severity: FailureSeverity,
        duration_secs: f64,
        now: f64,
    ) -> FailureInjection {
        let injection = self.failures.inject(kind, severity, duration_secs, now);
        self.metrics.inc_failure_injections();
        self.metrics.set_active_failure(true);
        self.logger.log_failure_injected(
            injection.kind.to_string().as_str(),
            injection.severity.to_string().as_str(),
            injection.duration_secs,
        );
        injection
    }

    /// Enable or disable autoscaling; returns the resulting status
    pub fn set_auto_scaling(&mut self, enabled: bool) -> ScalingStatus {
        self.autoscaler.set_enabled(enabled);
        self.logger
            .log_auto_scaling_toggled(enabled, self.autoscaler.pod_count());
        self.scaling_status()
    }

    /// Current scaling summary, using the most recent aggregate load
    pub fn scaling_status(&self) -> ScalingStatus {
        self.autoscaler.status(self.last_total_requests)
    }

    pub fn algorithm(&self) -> LoadBalancingAlgorithm {
        self.algorithm
    }

    pub fn pod_count(&self) -> u32 {
        self.autoscaler.pod_count()
    }

    pub fn active_failure(&self) -> Option<&FailureInjection> {
        self.failures.active()
    }
}

/// Builder for the cluster simulator
///
/// Every knob has a default, so multiple independent simulators can be
/// spun up in tests with a couple of lines.
pub struct ClusterSimulatorBuilder {
    cluster_name: String,
    autoscaler_config: AutoscalerConfig,
    sampler_config: SamplerConfig,
    history_capacity: usize,
    seed: Option<u64>,
    source: Option<Box<dyn PodMetricsSource>>,
}

impl ClusterSimulatorBuilder {
    pub fn new() -> Self {
        Self {
            cluster_name: "simulated-cluster".to_string(),
            autoscaler_config: AutoscalerConfig::default(),
            sampler_config: SamplerConfig::default(),
            history_capacity: 100,
            seed: None,
            source: None,
        }
    }

    /// Set the cluster name used in structured log events
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = name.into();
        self
    }

    /// Set the autoscaler configuration
    pub fn autoscaler_config(mut self, config: AutoscalerConfig) -> Self {
        self.autoscaler_config = config;
        self
    }

    /// Set the synthetic sampler configuration
    pub fn sampler_config(mut self, config: SamplerConfig) -> Self {
        self.sampler_config = config;
        self
    }

    /// Set the history buffer capacity
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Fix the sampler seed for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the synthetic sampler with a custom metrics source
    pub fn source(mut self, source: Box<dyn PodMetricsSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the simulator; `now` stamps the initial autoscaler cooldown
    pub fn build(self, now: f64) -> ClusterSimulator {
        let source = self.source.unwrap_or_else(|| {
            let sampler = match self.seed {
                Some(seed) => SyntheticSampler::with_seed(self.sampler_config, seed),
                None => SyntheticSampler::new(self.sampler_config),
            };
            Box::new(sampler)
        });

        ClusterSimulator {
            source,
            autoscaler: Autoscaler::new(self.autoscaler_config, now),
            failures: FailureInjector::new(),
            history: HistoryBuffer::with_capacity(self.history_capacity),
            algorithm: LoadBalancingAlgorithm::RoundRobin,
            last_total_requests: 0,
            metrics: SimulatorMetrics::new(),
            logger: StructuredLogger::new(self.cluster_name),
        }
    }
}

impl Default for ClusterSimulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
