//! Error types for optimisation runs.
//!
//! Every error is fatal: the first one stops the run. Errors are split into two
//! families:
//! - configuration errors, raised while parsing, validating or planning, before
//!   any statement of the run is executed;
//! - execution errors, raised by the database while a statement is applied.
//!   Statements applied before the failure stay applied.

use thiserror::Error;

/// Result type for optimisation operations.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Errors that can occur while planning or applying optimisations.
#[derive(Error, Debug)]
pub enum OptimizeError {
    /// Malformed or otherwise invalid configuration payload
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Two manual indexes share a name
    #[error("Configuration error: duplicate index name '{0}'")]
    DuplicateIndexName(String),

    /// A relation declares no key pairs, so no lookup can be built
    #[error("Configuration error: relation from '{table}' to '{target}' has no key pairs")]
    MissingRelationKeys {
        /// Table owning the relation
        table: String,
        /// Target table of the relation
        target: String,
    },

    /// `external-fid-columns` is present but names no columns
    #[error(
        "Configuration error: external-fid-columns for '{0}' is empty; omit the field to disable external identifiers"
    )]
    EmptyExternalFidColumns(String),

    /// Unknown service type requested at startup
    #[error("Invalid value for service-type: '{0}'")]
    InvalidServiceType(String),

    /// The geopackage could not be opened
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The content catalog could not be read
    #[error("Inventory error: {0}")]
    InventoryError(String),

    /// The database rejected a statement
    #[error("Execution error: {message} (statement: {statement})")]
    ExecutionError {
        /// SQL text of the failing statement
        statement: String,
        /// Error reported by the engine
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl OptimizeError {
    /// Create a config error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a connection error
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError(message.into())
    }

    /// Create an inventory error
    pub fn inventory_error(message: impl Into<String>) -> Self {
        Self::InventoryError(message.into())
    }

    /// Create an execution error for the given statement
    pub fn execution_error(statement: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionError {
            statement: statement.into(),
            message: message.into(),
        }
    }

    /// Whether this error stems from the configuration rather than the database.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_)
                | Self::DuplicateIndexName(_)
                | Self::MissingRelationKeys { .. }
                | Self::EmptyExternalFidColumns(_)
                | Self::InvalidServiceType(_)
                | Self::SerializationError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        assert!(OptimizeError::DuplicateIndexName("idx".into()).is_config_error());
        assert!(OptimizeError::MissingRelationKeys {
            table: "other".into(),
            target: "pand".into(),
        }
        .is_config_error());
        assert!(!OptimizeError::execution_error("ANALYZE", "database is locked").is_config_error());
        assert!(!OptimizeError::inventory_error("no such table: gpkg_contents").is_config_error());
    }

    #[test]
    fn test_execution_error_mentions_statement() {
        let err = OptimizeError::execution_error("ANALYZE", "database is locked");
        let msg = err.to_string();
        assert!(msg.contains("ANALYZE"));
        assert!(msg.contains("database is locked"));
    }
}
