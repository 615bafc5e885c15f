//! Run driver: inventory, plan, apply.

use std::fmt;
use std::time::Instant;

use gpkg_optimizer_observability::record_run_complete;
use tracing::info;
use uuid::Uuid;

use crate::apply::apply_plan;
use crate::catalog::Table;
use crate::config::{OptimizeProfile, ServiceType};
use crate::error::OptimizeResult;
use crate::identifier::DEFAULT_NAMESPACE;
use crate::plan::Plan;
use crate::planner::{OafPlanner, OwsPlanner};
use crate::traits::{StatementExecutor, TableInventory};

/// Options that do not come from the configuration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// Namespace for external identifiers
    pub namespace: Uuid,
    /// Plan only, execute nothing
    pub dry_run: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE,
            dry_run: false,
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeSummary {
    /// Service type optimised for
    pub service_type: ServiceType,
    /// Tables in the inventory
    pub tables: usize,
    /// Skip events (whole tables or their spatial step)
    pub skipped: usize,
    /// Statements in the plan
    pub statements_planned: usize,
    /// Statements actually executed
    pub statements_executed: usize,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl fmt::Display for OptimizeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} optimization: {} tables, {} skipped, {}/{} statements executed{}",
            self.service_type,
            self.tables,
            self.skipped,
            self.statements_executed,
            self.statements_planned,
            if self.dry_run { " (dry run)" } else { "" }
        )
    }
}

/// Plan and summary of a finished run.
#[derive(Debug, Clone)]
pub struct OptimizeReport {
    /// The plan that was applied (or would have been, on a dry run)
    pub plan: Plan,
    /// Counts
    pub summary: OptimizeSummary,
}

/// Drives one optimisation run against a geopackage.
#[derive(Debug, Clone)]
pub struct Optimizer {
    profile: OptimizeProfile,
    options: OptimizeOptions,
}

impl Optimizer {
    /// Optimizer for a profile with default options.
    pub fn new(profile: OptimizeProfile) -> Self {
        Self {
            profile,
            options: OptimizeOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: OptimizeOptions) -> Self {
        self.options = options;
        self
    }

    /// The profile this optimizer runs.
    pub fn profile(&self) -> &OptimizeProfile {
        &self.profile
    }

    /// Build the full plan for an inventory. Nothing is executed.
    pub fn plan(&self, tables: &[Table]) -> OptimizeResult<Plan> {
        match &self.profile {
            OptimizeProfile::Ows(config) => OwsPlanner::new(config.as_ref()).plan(tables),
            OptimizeProfile::Oaf(config) => OafPlanner::new(config.as_ref())
                .with_namespace(self.options.namespace)
                .plan(tables),
        }
    }

    /// Read the inventory, plan, and apply the plan unless this is a dry run.
    ///
    /// The whole plan is built before the first statement runs, so
    /// configuration errors never leave a partially optimised database.
    pub async fn run<D>(&self, db: &mut D) -> OptimizeResult<OptimizeReport>
    where
        D: TableInventory + StatementExecutor + ?Sized,
    {
        let service_type = self.profile.service_type();
        let started = Instant::now();
        info!(service_type = %service_type, dry_run = self.options.dry_run, "performing optimizations");

        let tables = db.tables().await?;
        info!(tables = tables.len(), "read gpkg_contents");

        let plan = self.plan(&tables)?;
        let executed = if self.options.dry_run {
            0
        } else {
            apply_plan(&plan, db).await?
        };
        record_run_complete(service_type.as_str(), executed, started.elapsed());

        let summary = OptimizeSummary {
            service_type,
            tables: tables.len(),
            skipped: plan.skipped().len(),
            statements_planned: plan.len(),
            statements_executed: executed,
            dry_run: self.options.dry_run,
        };
        Ok(OptimizeReport { plan, summary })
    }
}
