//! Seams between the planners and the database.

use async_trait::async_trait;

use crate::catalog::Table;
use crate::error::OptimizeResult;
use crate::statement::Statement;

/// Enumerates the tables of the content catalog.
#[async_trait]
pub trait TableInventory: Send {
    /// Tables in catalog order, each tagged with its content type.
    ///
    /// Failure is fatal: nothing can be planned without the inventory.
    async fn tables(&mut self) -> OptimizeResult<Vec<Table>>;
}

/// Applies one statement at a time.
///
/// Implementations must not retry and must not wrap statements in a shared
/// transaction: every statement commits on its own.
#[async_trait]
pub trait StatementExecutor: Send {
    /// Execute a statement and wait for it to complete.
    async fn execute(&mut self, statement: &Statement) -> OptimizeResult<()>;
}
