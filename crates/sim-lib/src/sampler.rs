//! Synthetic per-pod metric generation
//!
//! Produces one plausible `PodMetric` per virtual pod per sampling call.
//! Pure value generation with no I/O; a real metrics backend can replace
//! the `PodMetricsSource` implementation without changing any downstream
//! contract.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{HealthStatus, PodMetric};

/// Sampling window used for throughput derivation (seconds)
const SAMPLING_WINDOW_SECS: f64 = 60.0;

/// Health-check failures at or above this count mark a pod degraded
const HEALTH_FAILURE_THRESHOLD: u32 = 2;

/// Source of per-pod metrics for one sampling cycle
///
/// The synthetic implementation draws bounded random values; an adapter
/// over a real ingress controller would implement the same contract and
/// translate its own faults into an explicit unavailable outcome.
pub trait PodMetricsSource: Send {
    /// Produce exactly `pod_count` metric records for the instant `now`
    fn sample(&mut self, pod_count: u32, now: f64) -> Vec<PodMetric>;
}

/// Configuration for the synthetic sampler's value ranges
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Base per-pod request load, drawn once per cycle
    pub base_load_min: i64,
    pub base_load_max: i64,
    /// Symmetric variance applied to all pods but the last
    pub variance_min: i64,
    pub variance_max: i64,
    /// Wider, positively-skewed variance for the last pod. This is the
    /// deliberate imbalance signal the balance scorer detects.
    pub skew_variance_min: i64,
    pub skew_variance_max: i64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            base_load_min: 800,
            base_load_max: 1400,
            variance_min: -50,
            variance_max: 50,
            skew_variance_min: -100,
            skew_variance_max: 150,
        }
    }
}

/// Bounded-random pod metric generator
pub struct SyntheticSampler {
    config: SamplerConfig,
    rng: StdRng,
}

impl SyntheticSampler {
    /// Create a sampler seeded from OS entropy
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a sampler with a fixed seed for reproducible output
    pub fn with_seed(config: SamplerConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sample_pod(&mut self, index: u32, is_last: bool, base_load: i64, now: f64) -> PodMetric {
        let variance = if is_last {
            self.rng
                .gen_range(self.config.skew_variance_min..=self.config.skew_variance_max)
        } else {
            self.rng
                .gen_range(self.config.variance_min..=self.config.variance_max)
        };
        let requests = (base_load + variance).max(0) as u64;

        let health_check_failures = self.rng.gen_range(0..=2u32);
        let health_status = if health_check_failures < HEALTH_FAILURE_THRESHOLD {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        let errors_4xx = self.rng.gen_range(5..=20u64);
        let errors_5xx = self.rng.gen_range(0..=5u64);
        // Clamp so successful_requests can never underflow
        let total_errors = (errors_4xx + errors_5xx).min(requests);

        let error_rate = if requests > 0 {
            total_errors as f64 / requests as f64
        } else {
            0.0
        };

        PodMetric {
            name: format!("backend-pod-{index}"),
            requests,
            successful_requests: requests - total_errors,
            errors_4xx,
            errors_5xx,
            total_errors,
            response_time_ms: self.rng.gen_range(40.0..60.0),
            response_time_p50: self.rng.gen_range(35.0..45.0),
            response_time_p90: self.rng.gen_range(55.0..75.0),
            response_time_p95: self.rng.gen_range(70.0..95.0),
            response_time_p99: self.rng.gen_range(100.0..150.0),
            cpu_usage: self.rng.gen_range(30.0..70.0),
            memory_usage: self.rng.gen_range(40.0..60.0),
            error_rate,
            active_connections: self.rng.gen_range(50..=150u64),
            health_status,
            health_check_failures,
            last_health_check: now - self.rng.gen_range(0.0..10.0),
            throughput_rps: requests as f64 / SAMPLING_WINDOW_SECS,
        }
    }
}

impl PodMetricsSource for SyntheticSampler {
    fn sample(&mut self, pod_count: u32, now: f64) -> Vec<PodMetric> {
        let base_load = self
            .rng
            .gen_range(self.config.base_load_min..=self.config.base_load_max);

        (0..pod_count)
            .map(|i| self.sample_pod(i, i + 1 == pod_count, base_load, now))
            .collect()
    }
}

impl Default for SyntheticSampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}
