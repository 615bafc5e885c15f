//! Planners turning an inventory and a configuration into an ordered [`Plan`](crate::plan::Plan).

/// OAF planner.
pub mod oaf;
/// OWS planner.
pub mod ows;
/// Cross-table relation pass of the OAF planner.
pub mod relations;

pub use oaf::OafPlanner;
pub use ows::OwsPlanner;
pub use relations::RelationResolver;
