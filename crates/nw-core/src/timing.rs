//! Opt-in timing of the build and layout phases.
//!
//! Inert unless `enable_timing()` was called or `NW_TIMING` is set. Each
//! finished timer logs through `tracing` and adds to its phase's totals.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Turn timing on for the rest of the process.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var_os("NW_TIMING").is_some()
}

/// Builder bodies, including the nested requests they make.
pub static BUILD: Phase = Phase::new("build");
/// The layout engine.
pub static LAYOUT: Phase = Phase::new("layout");

/// Process-wide running totals for one phase.
pub struct Phase {
    name: &'static str,
    total_ns: AtomicU64,
    count: AtomicU64,
}

/// Snapshot of a phase's totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTotals {
    pub count: u64,
    pub total: Duration,
}

impl Phase {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn totals(&self) -> PhaseTotals {
        PhaseTotals {
            count: self.count.load(Ordering::Relaxed),
            total: Duration::from_nanos(self.total_ns.load(Ordering::Relaxed)),
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// A running measurement of one phase. Captures no clock when disabled.
pub struct Timer {
    phase: &'static Phase,
    started: Option<Instant>,
}

impl Timer {
    pub fn start(phase: &'static Phase) -> Self {
        Self {
            phase,
            started: is_enabled().then(Instant::now),
        }
    }

    /// Stop, add to the phase totals and log. `subject` names what was
    /// timed (usually a graph name).
    pub fn finish(self, subject: &str) -> Option<Duration> {
        let elapsed = self.started?.elapsed();
        self.phase.record(elapsed);
        tracing::debug!(
            phase = self.phase.name,
            subject,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "timing"
        );
        Some(elapsed)
    }
}
