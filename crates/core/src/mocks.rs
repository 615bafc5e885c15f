//! In-memory geopackage double for tests.

use async_trait::async_trait;

use crate::catalog::Table;
use crate::error::{OptimizeError, OptimizeResult};
use crate::statement::Statement;
use crate::traits::{StatementExecutor, TableInventory};

/// Serves a fixed inventory and records executed statements.
#[derive(Debug, Clone, Default)]
pub struct MockGeopackage {
    tables: Vec<Table>,
    executed: Vec<Statement>,
    fail_on: Option<String>,
    inventory_error: Option<String>,
}

impl MockGeopackage {
    /// Mock with the given inventory.
    pub fn new(tables: Vec<Table>) -> Self {
        MockGeopackage {
            tables,
            ..Default::default()
        }
    }

    /// Fail the first statement whose SQL contains `fragment`.
    pub fn fail_on(mut self, fragment: impl Into<String>) -> Self {
        self.fail_on = Some(fragment.into());
        self
    }

    /// Make the inventory query fail.
    pub fn failing_inventory(mut self, message: impl Into<String>) -> Self {
        self.inventory_error = Some(message.into());
        self
    }

    /// Statements executed so far.
    pub fn executed(&self) -> &[Statement] {
        &self.executed
    }

    /// SQL of the statements executed so far.
    pub fn executed_sql(&self) -> Vec<String> {
        self.executed.iter().map(Statement::to_sql).collect()
    }
}

#[async_trait]
impl TableInventory for MockGeopackage {
    async fn tables(&mut self) -> OptimizeResult<Vec<Table>> {
        match &self.inventory_error {
            Some(message) => Err(OptimizeError::inventory_error(message.clone())),
            None => Ok(self.tables.clone()),
        }
    }
}

#[async_trait]
impl StatementExecutor for MockGeopackage {
    async fn execute(&mut self, statement: &Statement) -> OptimizeResult<()> {
        let sql = statement.to_sql();
        if let Some(fragment) = &self.fail_on {
            if sql.contains(fragment.as_str()) {
                return Err(OptimizeError::execution_error(sql, "mock failure"));
            }
        }
        self.executed.push(statement.clone());
        Ok(())
    }
}
