#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gpkg_optimizer_sql::SqliteGeopackage;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use tempfile::TempDir;

/// Creates a geopackage file with a minimal content catalog plus `setup` statements.
///
/// `catalog` lists `(table_name, data_type)` in insertion order.
pub async fn create_geopackage(
    dir: &TempDir,
    catalog: &[(&str, &str)],
    setup: &[&str],
) -> Result<PathBuf, sqlx::Error> {
    let path = dir.path().join("test.gpkg");
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;

    sqlx::query(
        r#"CREATE TABLE gpkg_contents (
                table_name TEXT NOT NULL PRIMARY KEY,
                data_type TEXT NOT NULL,
                identifier TEXT UNIQUE,
                description TEXT DEFAULT '',
                srs_id INTEGER
            )"#,
    )
    .execute(&pool)
    .await?;

    for (table_name, data_type) in catalog {
        sqlx::query("INSERT INTO gpkg_contents (table_name, data_type, identifier) VALUES (?, ?, ?)")
            .bind(*table_name)
            .bind(*data_type)
            .bind(*table_name)
            .execute(&pool)
            .await?;
    }
    for stmt in setup {
        sqlx::raw_sql(stmt).execute(&pool).await?;
    }
    pool.close().await;
    Ok(path)
}

/// Opens a test geopackage without extension modules.
pub async fn open(path: &Path) -> SqliteGeopackage {
    SqliteGeopackage::open_with_extensions(path, &[])
        .await
        .expect("open geopackage")
}

/// Column names of `table`.
pub async fn columns(pool: &SqlitePool, table: &str) -> Vec<String> {
    sqlx::query("SELECT name FROM pragma_table_info(?) ORDER BY cid")
        .bind(table)
        .fetch_all(pool)
        .await
        .expect("table info")
        .into_iter()
        .map(|row| row.get::<String, _>("name"))
        .collect()
}

/// Column names of `index`, in index order.
pub async fn index_columns(pool: &SqlitePool, index: &str) -> Vec<String> {
    sqlx::query("SELECT name FROM pragma_index_info(?) ORDER BY seqno")
        .bind(index)
        .fetch_all(pool)
        .await
        .expect("index info")
        .into_iter()
        .map(|row| row.get::<String, _>("name"))
        .collect()
}

/// Whether `index` on `table` is unique, `None` if it does not exist.
pub async fn index_is_unique(pool: &SqlitePool, table: &str, index: &str) -> Option<bool> {
    sqlx::query(r#"SELECT "unique" FROM pragma_index_list(?) WHERE name = ?"#)
        .bind(table)
        .bind(index)
        .fetch_optional(pool)
        .await
        .expect("index list")
        .map(|row| row.get::<i64, _>("unique") == 1)
}

/// Names of all indexes in the database.
pub async fn index_names(pool: &SqlitePool) -> Vec<String> {
    sqlx::query("SELECT name FROM sqlite_master WHERE type = 'index' ORDER BY name")
        .fetch_all(pool)
        .await
        .expect("sqlite_master")
        .into_iter()
        .map(|row| row.get::<String, _>("name"))
        .collect()
}
