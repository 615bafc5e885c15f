//! gpkg-optimizer-observability
//!
//! Structured run metrics emitted as `tracing` events, backed by process-wide counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{info, warn};

static STATEMENTS_APPLIED_TOTAL: AtomicU64 = AtomicU64::new(0);
static STATEMENT_FAILURES_TOTAL: AtomicU64 = AtomicU64::new(0);
static TABLES_SKIPPED_TOTAL: AtomicU64 = AtomicU64::new(0);

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Records a successfully applied statement and its latency.
pub fn record_statement_applied(table: Option<&str>, phase: &str, duration: Duration) {
    let total = STATEMENTS_APPLIED_TOTAL.fetch_add(1, Ordering::Relaxed) + 1;
    info!(
        metric = "statement_latency_ms",
        table = table.unwrap_or("-"),
        phase,
        latency_ms = duration_ms(duration),
        statements_applied_total = total
    );
}

/// Records a statement failure. The run stops after this.
pub fn record_statement_failure(table: Option<&str>, phase: &str, error: &str) {
    let total = STATEMENT_FAILURES_TOTAL.fetch_add(1, Ordering::Relaxed) + 1;
    warn!(
        metric = "statement_failure",
        table = table.unwrap_or("-"),
        phase,
        error,
        statement_failures_total = total
    );
}

/// Records a table (or part of its treatment) that was skipped.
pub fn record_table_skipped(table: &str, reason: &str) {
    let total = TABLES_SKIPPED_TOTAL.fetch_add(1, Ordering::Relaxed) + 1;
    warn!(
        metric = "table_skipped",
        table,
        reason,
        tables_skipped_total = total
    );
}

/// Records the end of a run.
pub fn record_run_complete(mode: &str, statements: usize, duration: Duration) {
    info!(
        metric = "run_duration_ms",
        mode,
        statements,
        latency_ms = duration_ms(duration)
    );
}

/// Snapshot of the process-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Statements applied since process start.
    pub statements_applied: u64,
    /// Statements that failed since process start.
    pub statement_failures: u64,
    /// Skip events since process start.
    pub tables_skipped: u64,
}

/// Reads the current counter values.
pub fn counters() -> CounterSnapshot {
    CounterSnapshot {
        statements_applied: STATEMENTS_APPLIED_TOTAL.load(Ordering::Relaxed),
        statement_failures: STATEMENT_FAILURES_TOTAL.load(Ordering::Relaxed),
        tables_skipped: TABLES_SKIPPED_TOTAL.load(Ordering::Relaxed),
    }
}
