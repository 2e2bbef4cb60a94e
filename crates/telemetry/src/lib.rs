//! Drift monitoring for Steward.
//!
//! The reasoning loop fires non-fatal drift signals (`invalid_json`,
//! `unknown_tool`, `infinite_loop`) at a failure sink. This crate's
//! [`DriftMonitor`] is the in-process sink: thread-safe per-kind
//! counters plus a `tracing` warning per event, with a snapshot report
//! for operators. An external scrape/exposition layer can read the
//! report; the exposition itself is out of scope.

use serde::Serialize;
use std::sync::RwLock;
use steward_core::{DriftKind, FailureSink};
use tracing::warn;

/// A point-in-time snapshot of drift totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub invalid_json: u64,
    pub unknown_tool: u64,
    pub infinite_loop: u64,
}

impl DriftReport {
    pub fn total(&self) -> u64 {
        self.invalid_json + self.unknown_tool + self.infinite_loop
    }
}

/// Thread-safe drift counter implementing [`FailureSink`].
///
/// Recording never blocks the loop beyond a short counter write and
/// never panics: a poisoned lock drops the count rather than take the
/// request down.
#[derive(Default)]
pub struct DriftMonitor {
    counts: RwLock<DriftReport>,
}

impl DriftMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current totals.
    pub fn report(&self) -> DriftReport {
        self.counts.read().map(|c| *c).unwrap_or_default()
    }
}

impl FailureSink for DriftMonitor {
    fn record_reasoning_failure(&self, kind: DriftKind, details: serde_json::Value) {
        warn!(failure_type = %kind, %details, "reasoning failure detected");

        if let Ok(mut counts) = self.counts.write() {
            match kind {
                DriftKind::InvalidJson => counts.invalid_json += 1,
                DriftKind::UnknownTool => counts.unknown_tool += 1,
                DriftKind::InfiniteLoop => counts.infinite_loop += 1,
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
