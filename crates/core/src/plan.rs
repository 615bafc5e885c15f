//! Ordered statement plans produced by the planners.

use std::fmt;

use gpkg_optimizer_observability::record_table_skipped;

use crate::statement::Statement;

/// Planner step a statement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// OWS random per-row identifier
    OpaqueId,
    /// OWS `<table>.<puuid>` identifier
    CompoundId,
    /// OWS configured index
    ManualIndex,
    /// OAF free-form configured statement
    CustomSql,
    /// OAF deterministic external identifier
    ExternalFid,
    /// OAF temporal index
    Temporal,
    /// OAF bounding-box columns and spatial index
    Spatial,
    /// OAF cross-table relation column
    Relation,
    /// Engine statistics refresh
    Statistics,
}

impl Phase {
    /// Name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::OpaqueId => "opaque_id",
            Phase::CompoundId => "compound_id",
            Phase::ManualIndex => "manual_index",
            Phase::CustomSql => "custom_sql",
            Phase::ExternalFid => "external_fid",
            Phase::Temporal => "temporal",
            Phase::Spatial => "spatial",
            Phase::Relation => "relation",
            Phase::Statistics => "statistics",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One statement of a plan, tagged with where it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    /// Table the statement belongs to, `None` for database-wide statements
    pub table: Option<String>,
    /// Planner step
    pub phase: Phase,
    /// Statement to execute
    pub statement: Statement,
}

/// Why a table, or part of its treatment, was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Table is in the inventory but not in the configuration
    NoConfiguration,
    /// Configuration names a table absent from the inventory
    NotInInventory,
    /// Spatial optimisation on a table without geometries
    NotFeatureTable,
}

impl SkipReason {
    /// Human readable reason.
    pub fn describe(&self) -> &'static str {
        match self {
            SkipReason::NoConfiguration => "no config found for gpkg table",
            SkipReason::NotInInventory => "configured table is not in gpkg_contents",
            SkipReason::NotFeatureTable => "not a feature table, skipping spatial optimization",
        }
    }
}

/// A skipped table with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    /// Table name
    pub table: String,
    /// Reason
    pub reason: SkipReason,
}

/// Ordered statements for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlanStep>,
    skipped: Vec<Skip>,
}

impl Plan {
    /// Empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement for `table`.
    pub fn push(&mut self, table: &str, phase: Phase, statement: Statement) {
        self.steps.push(PlanStep {
            table: Some(table.to_string()),
            phase,
            statement,
        });
    }

    /// Append a database-wide statement.
    pub fn push_global(&mut self, phase: Phase, statement: Statement) {
        self.steps.push(PlanStep {
            table: None,
            phase,
            statement,
        });
    }

    /// Record and log a skip.
    pub fn skip(&mut self, table: &str, reason: SkipReason) {
        record_table_skipped(table, reason.describe());
        self.skipped.push(Skip {
            table: table.to_string(),
            reason,
        });
    }

    /// Append all steps and skips of another plan.
    pub fn extend(&mut self, other: Plan) {
        self.steps.extend(other.steps);
        self.skipped.extend(other.skipped);
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Skips in the order they were recorded.
    pub fn skipped(&self) -> &[Skip] {
        &self.skipped
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps belonging to `table`.
    pub fn steps_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a PlanStep> + 'a {
        self.steps
            .iter()
            .filter(move |step| step.table.as_deref() == Some(table))
    }

    /// SQL of every step, in order.
    pub fn sql(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.statement.to_sql()).collect()
    }
}
