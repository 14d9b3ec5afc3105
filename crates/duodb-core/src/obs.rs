//! Router telemetry: advisory counters for routed, degraded, and diverged
//! operations. Counters never affect routing.

use crate::backend::BackendRole;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

///
/// RouterEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouterEvent {
    /// A read executed against one backend.
    ReadRouted { target: BackendRole },
    /// A write executed against one backend.
    WriteRouted { target: BackendRole },
    /// An operation completed with no backend selected.
    EmptyRoute,
    /// The policy port failed to produce a decision.
    PolicyFailure,
    /// A dual write diverged: one side committed, the other failed.
    PartialWrite,
    /// A chained clause was supported on only one side.
    StructuralMismatch,
}

///
/// MetricsSink
///
/// Event export hook. The router always feeds its own `RouterMetrics`; an
/// additional static sink can be attached per router for host telemetry.
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: RouterEvent);
}

///
/// RouterMetrics
///

#[derive(Debug, Default)]
pub struct RouterMetrics {
    reads_primary: AtomicU64,
    reads_secondary: AtomicU64,
    writes_primary: AtomicU64,
    writes_secondary: AtomicU64,
    empty_routes: AtomicU64,
    policy_failures: AtomicU64,
    partial_writes: AtomicU64,
    structural_mismatches: AtomicU64,
}

impl RouterMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time counter snapshot.
    #[must_use]
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            reads_primary: self.reads_primary.load(Ordering::Relaxed),
            reads_secondary: self.reads_secondary.load(Ordering::Relaxed),
            writes_primary: self.writes_primary.load(Ordering::Relaxed),
            writes_secondary: self.writes_secondary.load(Ordering::Relaxed),
            empty_routes: self.empty_routes.load(Ordering::Relaxed),
            policy_failures: self.policy_failures.load(Ordering::Relaxed),
            partial_writes: self.partial_writes.load(Ordering::Relaxed),
            structural_mismatches: self.structural_mismatches.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSink for RouterMetrics {
    fn record(&self, event: RouterEvent) {
        let counter = match event {
            RouterEvent::ReadRouted {
                target: BackendRole::Primary,
            } => &self.reads_primary,
            RouterEvent::ReadRouted {
                target: BackendRole::Secondary,
            } => &self.reads_secondary,
            RouterEvent::WriteRouted {
                target: BackendRole::Primary,
            } => &self.writes_primary,
            RouterEvent::WriteRouted {
                target: BackendRole::Secondary,
            } => &self.writes_secondary,
            RouterEvent::EmptyRoute => &self.empty_routes,
            RouterEvent::PolicyFailure => &self.policy_failures,
            RouterEvent::PartialWrite => &self.partial_writes,
            RouterEvent::StructuralMismatch => &self.structural_mismatches,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

///
/// MetricsReport
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MetricsReport {
    pub reads_primary: u64,
    pub reads_secondary: u64,
    pub writes_primary: u64,
    pub writes_secondary: u64,
    pub empty_routes: u64,
    pub policy_failures: u64,
    pub partial_writes: u64,
    pub structural_mismatches: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_per_event() {
        let metrics = RouterMetrics::new();
        metrics.record(RouterEvent::ReadRouted {
            target: BackendRole::Primary,
        });
        metrics.record(RouterEvent::ReadRouted {
            target: BackendRole::Primary,
        });
        metrics.record(RouterEvent::WriteRouted {
            target: BackendRole::Secondary,
        });
        metrics.record(RouterEvent::PartialWrite);

        let report = metrics.report();
        assert_eq!(report.reads_primary, 2);
        assert_eq!(report.writes_secondary, 1);
        assert_eq!(report.partial_writes, 1);
        assert_eq!(report.reads_secondary, 0);
    }
}
