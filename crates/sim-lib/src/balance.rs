//! Load balance scoring and imbalance detection
//!
//! Scores request distribution across pods via the coefficient of
//! variation and produces remediation hints when the balance drops
//! below the target accuracy. All functions are pure reads over a
//! snapshot and safe to call concurrently.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{ClusterSnapshot, PodMetric};

/// Default balance accuracy requirement
const DEFAULT_TARGET_ACCURACY: f64 = 0.95;

/// Balance score below this is a high-severity imbalance
const HIGH_SEVERITY_SCORE: f64 = 0.85;

/// A pod is overloaded when its requests exceed 1.2x the mean
const OVERLOAD_FACTOR: f64 = 1.2;

/// A pod is underloaded when its requests fall below 0.8x the mean
const UNDERLOAD_FACTOR: f64 = 0.8;

/// CV at which the balance score bottoms out at 0
const CV_FLOOR: f64 = 0.5;

/// Severity of a detected imbalance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImbalanceSeverity {
    Medium,
    High,
}

/// Imbalance report with remediation hints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImbalanceAlert {
    pub severity: ImbalanceSeverity,
    pub balance_score: f64,
    pub overloaded_pods: Vec<String>,
    pub underloaded_pods: Vec<String>,
    pub recommendation: String,
}

/// Scores load balance quality across the pod fleet
#[derive(Debug, Clone)]
pub struct BalanceAnalyzer {
    target_accuracy: f64,
}

impl BalanceAnalyzer {
    pub fn new(target_accuracy: f64) -> Self {
        Self { target_accuracy }
    }

    /// Balance score in [0.0, 1.0]; 1.0 is perfect balance
    ///
    /// Computed as `max(0, 1 - cv/0.5)` over the coefficient of variation
    /// of per-pod request counts. The linear mapping is a deliberate
    /// simplification kept for compatibility with existing consumers.
    pub fn balance_score(&self, snapshot: &ClusterSnapshot) -> f64 {
        let pods = &snapshot.pods;
        if pods.len() < 2 {
            return 1.0;
        }

        let mean = mean_requests(pods);
        if mean == 0.0 {
            return 1.0;
        }

        let cv = population_std_dev(pods, mean) / mean;
        let score = (1.0 - cv / CV_FLOOR).max(0.0);

        debug!(score = score, cv = cv, "Computed balance score");
        score
    }

    /// Detect a load imbalance; returns `None` when the score meets the
    /// target accuracy
    pub fn detect_imbalance(&self, snapshot: &ClusterSnapshot) -> Option<ImbalanceAlert> {
        let score = self.balance_score(snapshot);
        if score >= self.target_accuracy {
            return None;
        }

        let mean = mean_requests(&snapshot.pods);
        let overloaded_pods: Vec<String> = snapshot
            .pods
            .iter()
            .filter(|pod| pod.requests as f64 > mean * OVERLOAD_FACTOR)
            .map(|pod| pod.name.clone())
            .collect();
        let underloaded_pods: Vec<String> = snapshot
            .pods
            .iter()
            .filter(|pod| (pod.requests as f64) < mean * UNDERLOAD_FACTOR)
            .map(|pod| pod.name.clone())
            .collect();

        let severity = if score < HIGH_SEVERITY_SCORE {
            ImbalanceSeverity::High
        } else {
            ImbalanceSeverity::Medium
        };

        let recommendation = if overloaded_pods.is_empty() {
            "Review load balancing algorithm configuration".to_string()
        } else {
            format!(
                "Consider adjusting load balancer weights to reduce traffic to {}",
                overloaded_pods.join(", ")
            )
        };

        warn!(
            score = score,
            severity = ?severity,
            overloaded = overloaded_pods.len(),
            underloaded = underloaded_pods.len(),
            "Load imbalance detected"
        );

        Some(ImbalanceAlert {
            severity,
            balance_score: score,
            overloaded_pods,
            underloaded_pods,
            recommendation,
        })
    }
}

impl Default for BalanceAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_ACCURACY)
    }
}

fn mean_requests(pods: &[PodMetric]) -> f64 {
    if pods.is_empty() {
        return 0.0;
    }
    pods.iter().map(|pod| pod.requests as f64).sum::<f64>() / pods.len() as f64
}

// Population standard deviation (divisor n), matching the scoring
// contract exactly.
fn population_std_dev(pods: &[PodMetric], mean: f64) -> f64 {
    let variance = pods
        .iter()
        .map(|pod| (pod.requests as f64 - mean).powi(2))
        .sum::<f64>()
        / pods.len() as f64;
    variance.sqrt()
}

/// Aggregate results from an external load test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTestResults {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub response_time_p95: f64,
}

/// Analysis of a load test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTestAnalysis {
    pub success_rate: f64,
    pub performance_grade: char,
    pub recommendations: Vec<String>,
}

/// Grade and annotate load test results produced by an external generator
pub fn analyze_results(results: &LoadTestResults) -> LoadTestAnalysis {
    let success_rate = if results.total_requests > 0 {
        results.successful_requests as f64 / results.total_requests as f64
    } else {
        0.0
    };

    let performance_grade = match results.response_time_p95 {
        p95 if p95 < 50.0 => 'A',
        p95 if p95 < 100.0 => 'B',
        p95 if p95 < 200.0 => 'C',
        _ => 'D',
    };

    let mut recommendations = Vec::new();
    if results.response_time_p95 > 100.0 {
        recommendations.push(
            "High response times detected. Consider scaling up backend pods.".to_string(),
        );
    }
    if results.failed_requests > 0 && results.total_requests > 0 {
        let error_rate = results.failed_requests as f64 / results.total_requests as f64;
        if error_rate > 0.01 {
            recommendations.push(format!(
                "Error rate of {:.2}% is above threshold. Investigate backend errors.",
                error_rate * 100.0
            ));
        }
    }

    LoadTestAnalysis {
        success_rate,
        performance_grade,
        recommendations,
    }
}
