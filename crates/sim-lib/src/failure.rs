//! Failure injection lifecycle
//!
//! Tracks at most one active failure descriptor. Injection is
//! last-write-wins; expiry is lazy, checked once per sampling cycle
//! rather than by a background timer.

use crate::models::{FailureInjection, FailureKind, FailureSeverity};

/// Single-slot holder for the active failure injection
#[derive(Debug, Default)]
pub struct FailureInjector {
    active: Option<FailureInjection>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Inject a failure, overwriting any existing one unconditionally
    pub fn inject(
        &mut self,
        kind: FailureKind,
        severity: FailureSeverity,
        duration_secs: f64,
        now: f64,
    ) -> FailureInjection {
        let duration_secs = duration_secs.max(0.0);
        let injection = FailureInjection {
            kind,
            severity,
            duration_secs,
            start_time: now,
            end_time: now + duration_secs,
        };

        self.active = Some(injection.clone());
        injection
    }

    /// Lazily expire the active injection. Returns the expired descriptor
    /// when `now` has passed its end, otherwise leaves it untouched.
    pub fn evaluate(&mut self, now: f64) -> Option<FailureInjection> {
        match &self.active {
            Some(injection) if injection.is_expired(now) => self.active.take(),
            _ => None,
        }
    }

    /// Currently active injection, if any
    pub fn active(&self) -> Option<&FailureInjection> {
        self.active.as_ref()
    }
}
