//! SQLite-backed geopackage: catalog enumeration and statement execution.

use std::path::Path;

use async_trait::async_trait;
use gpkg_optimizer_core::{
    ContentType, OptimizeError, OptimizeResult, Statement, StatementExecutor, Table,
    TableInventory,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::extensions::registered_extensions;

/// A geopackage opened over a single SQLite connection.
///
/// Statements run one at a time and each commits on its own.
pub struct SqliteGeopackage {
    pool: SqlitePool,
}

impl SqliteGeopackage {
    /// Opens an existing geopackage with the process-wide extension set.
    pub async fn open(path: impl AsRef<Path>) -> OptimizeResult<Self> {
        Self::open_with_extensions(path, registered_extensions()).await
    }

    /// Opens an existing geopackage, loading `extensions` on the connection.
    pub async fn open_with_extensions(
        path: impl AsRef<Path>,
        extensions: &[String],
    ) -> OptimizeResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), extensions = ?extensions, "opening geopackage");

        let options = extensions.iter().fold(
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(false)
                .journal_mode(SqliteJournalMode::Delete),
            |options, extension| options.extension(extension.clone()),
        );
        let pool = pool_options().connect_with(options).await.map_err(|e| {
            OptimizeError::connection_error(format!(
                "error opening geopackage '{}': {e}",
                path.display()
            ))
        })?;
        Ok(Self { pool })
    }

    /// Connects with explicit options.
    pub async fn connect_with(options: SqliteConnectOptions) -> OptimizeResult<Self> {
        let pool = pool_options().connect_with(options).await.map_err(|e| {
            OptimizeError::connection_error(format!("error opening geopackage: {e}"))
        })?;
        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Statements must run one after the other on the same connection.
fn pool_options() -> SqlitePoolOptions {
    SqlitePoolOptions::new().max_connections(1)
}

#[async_trait]
impl TableInventory for SqliteGeopackage {
    async fn tables(&mut self) -> OptimizeResult<Vec<Table>> {
        let rows = sqlx::query("SELECT table_name, data_type FROM gpkg_contents")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                OptimizeError::inventory_error(format!("error selecting gpkg_contents: {e}"))
            })?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row
                .try_get("table_name")
                .map_err(|e| OptimizeError::inventory_error(e.to_string()))?;
            let data_type: String = row
                .try_get("data_type")
                .map_err(|e| OptimizeError::inventory_error(e.to_string()))?;
            debug!(table = %name, data_type = %data_type, "found gpkg table");
            tables.push(Table::new(name, ContentType::from_data_type(&data_type)));
        }
        Ok(tables)
    }
}

#[async_trait]
impl StatementExecutor for SqliteGeopackage {
    async fn execute(&mut self, statement: &Statement) -> OptimizeResult<()> {
        let sql = statement.to_sql();
        sqlx::raw_sql(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| OptimizeError::execution_error(sql.clone(), e.to_string()))?;
        Ok(())
    }
}
