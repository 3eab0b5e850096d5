//! Autoscaling controller for the virtual pod pool
//!
//! Drives `pod_count` once per sampling cycle from the aggregate request
//! load, moving by at most one pod per cycle and rate-limited by a
//! wall-clock cooldown.

use std::time::Duration;

use tracing::info;

use crate::models::ScalingStatus;

/// Autoscaler configuration
#[derive(Debug, Clone)]
pub struct AutoscalerConfig {
    /// Lower bound on the pod pool
    pub min_pods: u32,
    /// Upper bound on the pod pool
    pub max_pods: u32,
    /// Average requests-per-pod above which the pool grows
    pub scale_up_threshold: f64,
    /// Average requests-per-pod below which the pool shrinks
    pub scale_down_threshold: f64,
    /// Minimum wall-clock interval between scaling actions
    pub cooldown: Duration,
    /// Pod count at startup
    pub initial_pods: u32,
}

impl Default for AutoscalerConfig {
    fn default() -> Self {
        Self {
            min_pods: 2,
            max_pods: 10,
            scale_up_threshold: 1200.0,
            scale_down_threshold: 800.0,
            cooldown: Duration::from_secs(30),
            initial_pods: 3,
        }
    }
}

/// Direction of a scaling action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    Up,
    Down,
}

/// A scaling action taken during one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleEvent {
    pub direction: ScaleDirection,
    pub from_pods: u32,
    pub to_pods: u32,
    pub avg_load_per_pod: f64,
}

/// State machine over the virtual pod count
pub struct Autoscaler {
    config: AutoscalerConfig,
    pod_count: u32,
    last_scale_time: f64,
    enabled: bool,
}

impl Autoscaler {
    /// Create an autoscaler; `now` stamps the initial cooldown window
    ///
    /// Bound ordering is the config boundary's responsibility; inverted
    /// bounds are tolerated here (max wins) rather than panicking.
    pub fn new(config: AutoscalerConfig, now: f64) -> Self {
        let pod_count = config
            .initial_pods
            .max(config.min_pods)
            .min(config.max_pods);
        Self {
            config,
            pod_count,
            last_scale_time: now,
            enabled: true,
        }
    }

    /// Evaluate one cycle. Moves `pod_count` by at most one step and only
    /// when enabled and outside the cooldown window.
    pub fn evaluate(&mut self, total_requests: u64, now: f64) -> Option<ScaleEvent> {
        if !self.enabled || now - self.last_scale_time < self.config.cooldown.as_secs_f64() {
            return None;
        }

        let avg_load = self.avg_load(total_requests);

        if avg_load > self.config.scale_up_threshold && self.pod_count < self.config.max_pods {
            let from_pods = self.pod_count;
            self.pod_count += 1;
            self.last_scale_time = now;
            info!(
                from = from_pods,
                to = self.pod_count,
                avg_load = avg_load,
                "Scaling up pod pool"
            );
            Some(ScaleEvent {
                direction: ScaleDirection::Up,
                from_pods,
                to_pods: self.pod_count,
                avg_load_per_pod: avg_load,
            })
        } else if avg_load < self.config.scale_down_threshold
            && self.pod_count > self.config.min_pods
        {
            let from_pods = self.pod_count;
            self.pod_count -= 1;
            self.last_scale_time = now;
            info!(
                from = from_pods,
                to = self.pod_count,
                avg_load = avg_load,
                "Scaling down pod pool"
            );
            Some(ScaleEvent {
                direction: ScaleDirection::Down,
                from_pods,
                to_pods: self.pod_count,
                avg_load_per_pod: avg_load,
            })
        } else {
            None
        }
    }

    /// Enable or disable autoscaling. Disabling freezes the pod count;
    /// re-enabling does not reset the cooldown timer.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pod_count(&self) -> u32 {
        self.pod_count
    }

    pub fn config(&self) -> &AutoscalerConfig {
        &self.config
    }

    /// Average requests per pod for a given aggregate
    pub fn avg_load(&self, total_requests: u64) -> f64 {
        if self.pod_count > 0 {
            total_requests as f64 / self.pod_count as f64
        } else {
            0.0
        }
    }

    /// Scaling summary for snapshot composition
    pub fn status(&self, total_requests: u64) -> ScalingStatus {
        ScalingStatus {
            current_pods: self.pod_count,
            min_pods: self.config.min_pods,
            max_pods: self.config.max_pods,
            avg_load_per_pod: self.avg_load(total_requests),
            auto_scaling_enabled: self.enabled,
        }
    }
}
