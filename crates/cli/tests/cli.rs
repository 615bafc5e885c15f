use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use gpkg_optimizer_cli::{run, Cli};
use gpkg_optimizer_core::{OptimizeError, ServiceType};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tempfile::tempdir;

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(create),
        )
        .await?;
    Ok(pool)
}

/// Minimal geopackage with one feature table and one attribute table.
async fn build_geopackage(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("bag.gpkg");
    let pool = connect(&path, true).await?;
    for sql in [
        "CREATE TABLE gpkg_contents (table_name TEXT NOT NULL PRIMARY KEY, data_type TEXT NOT NULL)",
        "INSERT INTO gpkg_contents VALUES ('pand', 'features'), ('status', 'attributes')",
        "CREATE TABLE pand (fid INTEGER PRIMARY KEY, geom BLOB, identificatie TEXT)",
        "CREATE TABLE status (fid INTEGER PRIMARY KEY, begin_date TEXT, end_date TEXT)",
        "INSERT INTO status (begin_date) VALUES ('2021-06-01')",
    ] {
        sqlx::query(sql).execute(&pool).await?;
    }
    pool.close().await;
    Ok(path)
}

async fn column_names(path: &Path, table: &str) -> Result<Vec<String>> {
    let pool = connect(path, false).await?;
    let names = sqlx::query_scalar(&format!("SELECT name FROM pragma_table_info('{table}')"))
        .fetch_all(&pool)
        .await?;
    pool.close().await;
    Ok(names)
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["gpkg-optimizer", "--extensions", ""];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn parses_full_argument_set() {
    let cli = Cli::try_parse_from([
        "gpkg-optimizer",
        "-s",
        "bag.gpkg",
        "--service-type",
        "oaf",
        "--config-file",
        "oaf.json",
        "--namespace",
        "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
        "--dry-run",
        "-v",
    ])
    .unwrap();

    assert_eq!(cli.source, PathBuf::from("bag.gpkg"));
    assert_eq!(cli.service_type, ServiceType::Oaf);
    assert_eq!(cli.config_file, Some(PathBuf::from("oaf.json")));
    assert_eq!(
        cli.namespace.to_string(),
        "6ba7b810-9dad-11d1-80b4-00c04fd430c8"
    );
    assert!(cli.dry_run);
    assert!(cli.verbose);
}

#[test]
fn source_is_required() {
    assert!(Cli::try_parse_from(["gpkg-optimizer", "--service-type", "ows"]).is_err());
}

#[tokio::test]
async fn malformed_config_is_rejected_before_opening() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing.gpkg");
    let cli = cli(&[
        "-s",
        missing.to_str().unwrap(),
        "--service-type",
        "oaf",
        "--config",
        "{\"layers\": [",
    ]);

    let err = run(&cli).await.unwrap_err();
    let err = err.downcast_ref::<OptimizeError>().unwrap();
    assert!(err.is_config_error());
    Ok(())
}

#[tokio::test]
async fn missing_geopackage_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing.gpkg");
    let cli = cli(&["-s", missing.to_str().unwrap()]);

    let err = run(&cli).await.unwrap_err();
    assert!(format!("{err:#}").contains("missing.gpkg"));
    Ok(())
}

#[tokio::test]
async fn missing_config_file_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let path = build_geopackage(dir.path()).await?;
    let config = dir.path().join("absent.json");
    let cli = cli(&[
        "-s",
        path.to_str().unwrap(),
        "--service-type",
        "oaf",
        "--config-file",
        config.to_str().unwrap(),
    ]);

    let err = run(&cli).await.unwrap_err();
    assert!(err.to_string().contains("absent.json"));
    Ok(())
}

#[tokio::test]
async fn ows_dry_run_leaves_geopackage_untouched() -> Result<()> {
    let dir = tempdir()?;
    let path = build_geopackage(dir.path()).await?;
    let cli = cli(&["-s", path.to_str().unwrap(), "--dry-run"]);

    let report = run(&cli).await?;

    assert!(report.summary.dry_run);
    assert_eq!(report.summary.tables, 2);
    assert_eq!(report.summary.statements_planned, 2 * 6 + 1);
    assert_eq!(report.summary.statements_executed, 0);
    assert_eq!(
        column_names(&path, "pand").await?,
        vec!["fid", "geom", "identificatie"]
    );
    Ok(())
}

#[tokio::test]
async fn oaf_config_file_run_indexes_attribute_table() -> Result<()> {
    let dir = tempdir()?;
    let path = build_geopackage(dir.path()).await?;
    let config = dir.path().join("oaf.json");
    fs::write(
        &config,
        r#"{"layers": {"status": {
            "sql-statements": ["UPDATE status SET end_date = '2099-12-31' WHERE end_date IS NULL"],
            "temporal-columns": ["begin_date", "end_date"]
        }}}"#,
    )?;
    let cli = cli(&[
        "-s",
        path.to_str().unwrap(),
        "--service-type",
        "oaf",
        "--config-file",
        config.to_str().unwrap(),
    ]);

    let report = run(&cli).await?;
    assert_eq!(report.summary.service_type, ServiceType::Oaf);
    // custom statement, temporal index, statistics
    assert_eq!(report.summary.statements_executed, 3);

    let pool = connect(&path, false).await?;
    let end: String = sqlx::query_scalar("SELECT end_date FROM status")
        .fetch_one(&pool)
        .await?;
    assert_eq!(end, "2099-12-31");
    let indexed: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_index_info('status_temporal_idx')")
            .fetch_all(&pool)
            .await?;
    assert_eq!(indexed, vec!["begin_date", "end_date"]);
    pool.close().await;
    Ok(())
}
