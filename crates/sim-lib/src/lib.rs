//! Core library for the load-balanced fleet simulator
//!
//! This crate provides:
//! - Synthetic per-pod metric sampling
//! - An autoscaling controller over the virtual pod pool
//! - Failure injection with lazy, time-bounded expiry
//! - Bounded historical snapshot retention
//! - Balance scoring and imbalance detection
//! - Health checks and observability

pub mod balance;
pub mod cluster;
pub mod error;
pub mod failure;
pub mod health;
pub mod history;
pub mod models;
pub mod observability;
pub mod sampler;
pub mod scaler;

pub use balance::{BalanceAnalyzer, ImbalanceAlert, ImbalanceSeverity};
pub use cluster::{ClusterSimulator, ClusterSimulatorBuilder};
pub use error::SimError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{SimulatorMetrics, StructuredLogger};
