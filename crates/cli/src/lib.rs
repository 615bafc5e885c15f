//! Command line surface of the geopackage optimizer.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gpkg_optimizer_core::{
    OptimizeOptions, OptimizeProfile, OptimizeReport, Optimizer, ServiceType,
};
use gpkg_optimizer_sql::{register_extensions, SqliteGeopackage};
use tracing::info;
use uuid::Uuid;

/// Optimizes a geopackage for serving over OWS or OAF.
#[derive(Parser, Debug, Clone)]
#[command(name = "gpkg-optimizer", version, about = "Optimize a geopackage for OWS or OAF services", long_about = None)]
pub struct Cli {
    /// Geopackage to optimize in place
    #[arg(short = 's', long = "source", value_name = "GEOPACKAGE")]
    pub source: PathBuf,

    /// Service type to optimize for (ows, oaf)
    #[arg(long = "service-type", default_value = "ows")]
    pub service_type: ServiceType,

    /// Inline JSON configuration
    #[arg(long, value_name = "JSON", conflicts_with = "config_file")]
    pub config: Option<String>,

    /// Path to a JSON configuration file
    #[arg(long = "config-file", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// SQLite extension modules to load
    #[arg(
        long,
        env = "GPKG_OPTIMIZER_EXTENSIONS",
        value_delimiter = ',',
        default_value = "mod_spatialite,uuid"
    )]
    pub extensions: Vec<String>,

    /// UUID namespace for external identifiers
    #[arg(
        long,
        env = "GPKG_OPTIMIZER_NAMESPACE",
        default_value = "098c4e26-6e36-5693-bae9-df35db0bee49"
    )]
    pub namespace: Uuid,

    /// Print the planned statements without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The configuration payload, read from `--config-file` if given.
    pub fn payload(&self) -> Result<Option<String>> {
        match (&self.config, &self.config_file) {
            (Some(inline), _) => Ok(Some(inline.clone())),
            (None, Some(path)) => fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("unable to read config file {}", path.display())),
            (None, None) => Ok(None),
        }
    }

    /// Parsed and validated profile.
    pub fn profile(&self) -> Result<OptimizeProfile> {
        let payload = self.payload()?;
        let profile = OptimizeProfile::from_payload(self.service_type, payload.as_deref())?;
        Ok(profile)
    }

    /// Run options.
    pub fn options(&self) -> OptimizeOptions {
        OptimizeOptions {
            namespace: self.namespace,
            dry_run: self.dry_run,
        }
    }

    /// Extension modules with blanks removed.
    pub fn extension_modules(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect()
    }
}

/// Executes an optimization run end-to-end.
///
/// The configuration is parsed before the geopackage is opened, so a bad
/// payload never touches the database.
pub async fn run(cli: &Cli) -> Result<OptimizeReport> {
    let profile = cli.profile()?;
    register_extensions(cli.extension_modules());

    info!(
        source = %cli.source.display(),
        service_type = %cli.service_type,
        "Performing optimizations for geopackage"
    );
    let mut db = SqliteGeopackage::open(&cli.source)
        .await
        .with_context(|| format!("error opening geopackage {}", cli.source.display()))?;

    let result = Optimizer::new(profile)
        .with_options(cli.options())
        .run(&mut db)
        .await;
    db.close().await;
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gpkg-optimizer", "-s", "x.gpkg"]).unwrap();
        assert_eq!(cli.service_type, ServiceType::Ows);
        assert!(cli.config.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.namespace, gpkg_optimizer_core::DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_invalid_service_type() {
        let result =
            Cli::try_parse_from(["gpkg-optimizer", "-s", "x.gpkg", "--service-type", "wms"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_and_config_file_conflict() {
        let result = Cli::try_parse_from([
            "gpkg-optimizer",
            "-s",
            "x.gpkg",
            "--config",
            "{}",
            "--config-file",
            "c.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_extension_list() {
        let cli = Cli::try_parse_from([
            "gpkg-optimizer",
            "-s",
            "x.gpkg",
            "--extensions",
            "mod_spatialite, ,uuid",
        ])
        .unwrap();
        assert_eq!(cli.extension_modules(), vec!["mod_spatialite", "uuid"]);
    }

    #[test]
    fn test_profile_from_inline_config() {
        let cli = Cli::try_parse_from([
            "gpkg-optimizer",
            "-s",
            "x.gpkg",
            "--service-type",
            "oaf",
            "--config",
            r#"{"layers": {"pand": {"temporal-columns": ["begin"]}}}"#,
        ])
        .unwrap();
        match cli.profile().unwrap() {
            OptimizeProfile::Oaf(Some(config)) => assert!(config.layer("pand").is_some()),
            other => panic!("unexpected profile: {other:?}"),
        }
    }
}
