//! Simulator process configuration

use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use sim_lib::scaler::AutoscalerConfig;
use sim_lib::SimError;

/// Simulator configuration, loaded from `SIMULATOR_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Cluster name used in structured log events
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Lower bound on the virtual pod pool
    #[serde(default = "default_min_pods")]
    pub min_pods: u32,

    /// Upper bound on the virtual pod pool
    #[serde(default = "default_max_pods")]
    pub max_pods: u32,

    /// Pod count at startup
    #[serde(default = "default_initial_pods")]
    pub initial_pods: u32,

    /// Requests-per-pod above which the pool grows
    #[serde(default = "default_scale_up_threshold")]
    pub scale_up_threshold: f64,

    /// Requests-per-pod below which the pool shrinks
    #[serde(default = "default_scale_down_threshold")]
    pub scale_down_threshold: f64,

    /// Minimum seconds between scaling actions
    #[serde(default = "default_scale_cooldown_secs")]
    pub scale_cooldown_secs: u64,

    /// Historical retention buffer capacity
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Optional fixed sampler seed for reproducible runs
    #[serde(default)]
    pub sampler_seed: Option<u64>,
}

fn default_cluster_name() -> String {
    "simulated-cluster".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_min_pods() -> u32 {
    2
}

fn default_max_pods() -> u32 {
    10
}

fn default_initial_pods() -> u32 {
    3
}

fn default_scale_up_threshold() -> f64 {
    1200.0
}

fn default_scale_down_threshold() -> f64 {
    800.0
}

fn default_scale_cooldown_secs() -> u64 {
    30
}

fn default_history_capacity() -> usize {
    100
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            cluster_name: default_cluster_name(),
            api_port: default_api_port(),
            min_pods: default_min_pods(),
            max_pods: default_max_pods(),
            initial_pods: default_initial_pods(),
            scale_up_threshold: default_scale_up_threshold(),
            scale_down_threshold: default_scale_down_threshold(),
            scale_cooldown_secs: default_scale_cooldown_secs(),
            history_capacity: default_history_capacity(),
            sampler_seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SIMULATOR"))
            .build()?;

        let config: Self = config.try_deserialize().unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulator cannot honor
    pub fn validate(&self) -> Result<(), SimError> {
        if self.min_pods > self.max_pods {
            return Err(SimError::InvalidPodBounds {
                min_pods: self.min_pods,
                max_pods: self.max_pods,
            });
        }
        Ok(())
    }

    /// Autoscaler configuration derived from the loaded values
    pub fn autoscaler_config(&self) -> AutoscalerConfig {
        AutoscalerConfig {
            min_pods: self.min_pods,
            max_pods: self.max_pods,
            scale_up_threshold: self.scale_up_threshold,
            scale_down_threshold: self.scale_down_threshold,
            cooldown: Duration::from_secs(self.scale_cooldown_secs),
            initial_pods: self.initial_pods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_simulated_cluster() {
        let config = SimulatorConfig::default();

        assert_eq!(config.min_pods, 2);
        assert_eq!(config.max_pods, 10);
        assert_eq!(config.initial_pods, 3);
        assert_eq!(config.scale_up_threshold, 1200.0);
        assert_eq!(config.scale_down_threshold, 800.0);
        assert_eq!(config.scale_cooldown_secs, 30);
        assert_eq!(config.history_capacity, 100);
        assert!(config.sampler_seed.is_none());
    }

    #[test]
    fn test_inverted_pod_bounds_rejected() {
        let config = SimulatorConfig {
            min_pods: 5,
            max_pods: 3,
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidPodBounds {
                min_pods: 5,
                max_pods: 3,
            }
        ));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(SimulatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_autoscaler_config_derivation() {
        let config = SimulatorConfig {
            min_pods: 1,
            max_pods: 5,
            scale_cooldown_secs: 10,
            ..Default::default()
        };

        let autoscaler = config.autoscaler_config();
        assert_eq!(autoscaler.min_pods, 1);
        assert_eq!(autoscaler.max_pods, 5);
        assert_eq!(autoscaler.cooldown, Duration::from_secs(10));
    }
}
