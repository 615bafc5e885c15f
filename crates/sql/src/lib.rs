//! gpkg-optimizer-sql
//!
//! SQLite binding for the geopackage optimizer, built on `sqlx`.

#![warn(missing_docs)]

/// Process-wide extension registration.
pub mod extensions;
/// Geopackage connection implementing the core traits.
pub mod sqlite;

pub use extensions::{register_extensions, registered_extensions, DEFAULT_EXTENSIONS};
pub use sqlite::SqliteGeopackage;
