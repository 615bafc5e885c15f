//! gpkg-optimizer-core
//!
//! Planning and application engine for one-shot geopackage schema optimisation.
//!
//! A run reads the table inventory from the content catalog, asks the planner
//! for the selected service type to build an ordered [`Plan`], and applies it
//! statement by statement through a [`StatementExecutor`]:
//!
//! - **OWS** adds a random per-row identifier (`puuid`) and a per-collection
//!   identifier (`fuuid` = `<table>.<puuid>`) to every table, each with a unique
//!   index, plus any manually configured indexes.
//! - **OAF** runs configured statements, derives deterministic `external_fid`
//!   values, builds temporal and spatial indexes per table, then resolves
//!   relations between tables in a separate pass.
//!
//! Both finish with a single statistics refresh. The first error stops the run.

#![warn(missing_docs)]

/// Plan application.
pub mod apply;
/// Catalog entries.
pub mod catalog;
/// Configuration model.
pub mod config;
/// Error types.
pub mod error;
/// Identifier policy.
pub mod identifier;
/// Test doubles.
pub mod mocks;
/// Run driver.
pub mod optimizer;
/// Plans and plan steps.
pub mod plan;
/// OWS/OAF planners and the relation resolver.
pub mod planner;
/// Statement model and SQL rendering.
pub mod statement;
/// Database seams.
pub mod traits;

pub use apply::apply_plan;
pub use catalog::{ContentType, Table};
pub use config::{
    KeyPair, LayerConfig, ManualIndex, OafConfig, OptimizeProfile, OwsConfig, Relation,
    RelationColumns, ServiceType,
};
pub use error::{OptimizeError, OptimizeResult};
pub use identifier::{derive_external_fid, DEFAULT_NAMESPACE};
pub use optimizer::{OptimizeOptions, OptimizeReport, OptimizeSummary, Optimizer};
pub use plan::{Phase, Plan, PlanStep, Skip, SkipReason};
pub use statement::{ColumnType, IndexDefinition, Statement};
pub use traits::{StatementExecutor, TableInventory};
