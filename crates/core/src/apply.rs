//! Sequential application of a plan.

use std::time::Instant;

use gpkg_optimizer_observability::{record_statement_applied, record_statement_failure};
use tracing::info;

use crate::error::OptimizeResult;
use crate::plan::Plan;
use crate::traits::StatementExecutor;

/// Execute every step in order and stop at the first failure.
///
/// Returns the number of statements executed. Nothing is rolled back on
/// failure.
pub async fn apply_plan<E>(plan: &Plan, executor: &mut E) -> OptimizeResult<usize>
where
    E: StatementExecutor + ?Sized,
{
    let mut executed = 0;
    for step in plan.steps() {
        let table = step.table.as_deref();
        let phase = step.phase.as_str();
        info!(
            table = table.unwrap_or("-"),
            phase,
            sql = %step.statement,
            "executing statement"
        );

        let started = Instant::now();
        if let Err(err) = executor.execute(&step.statement).await {
            record_statement_failure(table, phase, &err.to_string());
            return Err(err);
        }
        record_statement_applied(table, phase, started.elapsed());
        executed += 1;
    }
    Ok(executed)
}
