//! Configuration model for optimisation runs.
//!
//! Two payload shapes exist, one per service type:
//! - OAF: `{"layers": {"<table>": LayerConfig}}`
//! - OWS: `{"indices": [ManualIndex]}`
//!
//! Optional per-layer directives are modelled as `Option` so that an omitted field
//! and a field present with an empty list stay distinguishable.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OptimizeError, OptimizeResult};

/// Default name of the feature id column.
pub const DEFAULT_FID_COLUMN: &str = "fid";
/// Default name of the geometry column.
pub const DEFAULT_GEOM_COLUMN: &str = "geom";

fn default_fid_column() -> String {
    DEFAULT_FID_COLUMN.to_string()
}

fn default_geom_column() -> String {
    DEFAULT_GEOM_COLUMN.to_string()
}

/// Service type a geopackage is optimised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    /// Per-row and per-collection opaque identifiers plus manual indexes
    Ows,
    /// External identifiers, spatial/temporal indexes and relations
    Oaf,
}

impl ServiceType {
    /// Lower-case name as used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Ows => "ows",
            ServiceType::Oaf => "oaf",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ows" => Ok(ServiceType::Ows),
            "oaf" => Ok(ServiceType::Oaf),
            other => Err(OptimizeError::InvalidServiceType(other.to_string())),
        }
    }
}

/// OAF configuration: per-table directives keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OafConfig {
    /// Layer directives keyed by table name
    #[serde(default)]
    pub layers: BTreeMap<String, LayerConfig>,
}

impl OafConfig {
    /// Parse, default and validate an OAF payload.
    pub fn from_json(payload: &str) -> OptimizeResult<Self> {
        let mut config: OafConfig = serde_json::from_str(payload)
            .map_err(|e| OptimizeError::config_error(format!("cannot unmarshal oaf config: {e}")))?;
        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Directives for a table, if configured.
    pub fn layer(&self, table: &str) -> Option<&LayerConfig> {
        self.layers.get(table)
    }

    /// Replaces empty fid/geom column names with their defaults.
    pub fn apply_defaults(&mut self) {
        for layer in self.layers.values_mut() {
            layer.apply_defaults();
        }
    }

    /// Checks constraints that do not depend on the table inventory.
    pub fn validate(&self) -> OptimizeResult<()> {
        for (table, layer) in &self.layers {
            if matches!(&layer.external_fid_columns, Some(columns) if columns.is_empty()) {
                return Err(OptimizeError::EmptyExternalFidColumns(table.clone()));
            }
        }
        Ok(())
    }
}

/// Optimisation directives for a single table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Feature id column, leads the spatial index
    #[serde(rename = "fid-column", default = "default_fid_column")]
    pub fid_column: String,
    /// Geometry column the bounding box is read from
    #[serde(rename = "geom-column", default = "default_geom_column")]
    pub geom_column: String,
    /// Free-form statements executed before anything else
    #[serde(rename = "sql-statements", default)]
    pub sql_statements: Vec<String>,
    /// Columns seeding the external identifier
    #[serde(rename = "external-fid-columns", default)]
    pub external_fid_columns: Option<Vec<String>>,
    /// Columns of the temporal index
    #[serde(rename = "temporal-columns", default)]
    pub temporal_columns: Option<Vec<String>>,
    /// Relations to other tables
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            fid_column: default_fid_column(),
            geom_column: default_geom_column(),
            sql_statements: Vec::new(),
            external_fid_columns: None,
            temporal_columns: None,
            relations: Vec::new(),
        }
    }
}

impl LayerConfig {
    fn apply_defaults(&mut self) {
        if self.fid_column.is_empty() {
            self.fid_column = default_fid_column();
        }
        if self.geom_column.is_empty() {
            self.geom_column = default_geom_column();
        }
    }

    /// Whether an external identifier is derived for this table.
    pub fn has_external_fid(&self) -> bool {
        self.external_fid_columns.is_some()
    }

    /// Temporal columns, when configured and non-empty.
    pub fn temporal_columns(&self) -> Option<&[String]> {
        self.temporal_columns
            .as_deref()
            .filter(|columns| !columns.is_empty())
    }
}

/// A link from the owning table to another table's `external_fid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Target table
    pub table: String,
    /// Key pairs and column prefix
    pub columns: RelationColumns,
}

/// Join keys of a relation.
///
/// Deserialises from either a `keys` list or a single top-level `fk`/`pk` pair;
/// giving both is a configuration error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RelationColumnsPayload")]
pub struct RelationColumns {
    /// Key pairs, all of which must match
    #[serde(default)]
    pub keys: Vec<KeyPair>,
    /// Optional infix for the generated column name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Deserialize)]
struct RelationColumnsPayload {
    #[serde(default)]
    keys: Option<Vec<KeyPair>>,
    #[serde(default)]
    fk: Option<String>,
    #[serde(default)]
    pk: Option<String>,
    #[serde(default)]
    prefix: Option<String>,
}

impl TryFrom<RelationColumnsPayload> for RelationColumns {
    type Error = String;

    fn try_from(payload: RelationColumnsPayload) -> Result<Self, Self::Error> {
        let keys = match (payload.keys, payload.fk, payload.pk) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err("relation columns cannot combine keys with fk/pk".to_string())
            }
            (Some(keys), None, None) => keys,
            (None, Some(fk), Some(pk)) => vec![KeyPair::new(fk, pk)],
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err("relation columns need both fk and pk".to_string())
            }
            (None, None, None) => Vec::new(),
        };
        Ok(RelationColumns {
            keys,
            prefix: payload.prefix,
        })
    }
}

/// One equality condition of a relation join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// Column on the owning table
    #[serde(rename = "fk")]
    pub foreign_key: String,
    /// Column on the target table
    #[serde(rename = "pk")]
    pub primary_key: String,
}

impl KeyPair {
    /// Create a key pair.
    pub fn new(foreign_key: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            foreign_key: foreign_key.into(),
            primary_key: primary_key.into(),
        }
    }
}

impl Relation {
    /// Create a relation to `table` joined on `keys`.
    pub fn new(table: impl Into<String>, keys: Vec<KeyPair>) -> Self {
        Self {
            table: table.into(),
            columns: RelationColumns { keys, prefix: None },
        }
    }

    /// Set the column prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.columns.prefix = Some(prefix.into());
        self
    }

    /// Name of the generated column: `<target>[_<prefix>]_external_fid`.
    pub fn column_name(&self) -> String {
        match self.columns.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => {
                format!("{}_{}_external_fid", self.table, prefix)
            }
            _ => format!("{}_external_fid", self.table),
        }
    }

    /// Key pairs in declared order.
    pub fn keys(&self) -> &[KeyPair] {
        &self.columns.keys
    }

    /// Fails when the relation cannot be resolved by a lookup.
    pub fn validate(&self, owner: &str) -> OptimizeResult<()> {
        if self.columns.keys.is_empty() {
            return Err(OptimizeError::MissingRelationKeys {
                table: owner.to_string(),
                target: self.table.clone(),
            });
        }
        Ok(())
    }
}

/// OWS configuration: extra indexes to create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwsConfig {
    /// Manual index declarations
    #[serde(default)]
    pub indices: Vec<ManualIndex>,
}

impl OwsConfig {
    /// Parse and validate an OWS payload.
    pub fn from_json(payload: &str) -> OptimizeResult<Self> {
        let config: OwsConfig = serde_json::from_str(payload)
            .map_err(|e| OptimizeError::config_error(format!("cannot unmarshal ows config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Index names must be unique and every index needs a column.
    pub fn validate(&self) -> OptimizeResult<()> {
        let mut seen = HashSet::new();
        for index in &self.indices {
            if !seen.insert(index.name.as_str()) {
                return Err(OptimizeError::DuplicateIndexName(index.name.clone()));
            }
        }
        for index in &self.indices {
            if index.columns.is_empty() {
                return Err(OptimizeError::config_error(format!(
                    "index '{}' on '{}' has no columns",
                    index.name, index.table
                )));
            }
        }
        Ok(())
    }
}

/// An extra index declared in the OWS configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualIndex {
    /// Index name, unique across the configuration
    pub name: String,
    /// Indexed table
    pub table: String,
    /// Whether to create a unique index
    #[serde(default)]
    pub unique: bool,
    /// Indexed columns in order
    pub columns: Vec<String>,
}

/// Mode plus optional payload, fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeProfile {
    /// OWS optimisation
    Ows(Option<OwsConfig>),
    /// OAF optimisation
    Oaf(Option<OafConfig>),
}

impl OptimizeProfile {
    /// Build a profile from a service type and an optional JSON payload.
    ///
    /// An empty or whitespace-only payload counts as absent.
    pub fn from_payload(service: ServiceType, payload: Option<&str>) -> OptimizeResult<Self> {
        let payload = payload.filter(|p| !p.trim().is_empty());
        match service {
            ServiceType::Ows => Ok(OptimizeProfile::Ows(
                payload.map(OwsConfig::from_json).transpose()?,
            )),
            ServiceType::Oaf => Ok(OptimizeProfile::Oaf(
                payload.map(OafConfig::from_json).transpose()?,
            )),
        }
    }

    /// Service type of this profile.
    pub fn service_type(&self) -> ServiceType {
        match self {
            OptimizeProfile::Ows(_) => ServiceType::Ows,
            OptimizeProfile::Oaf(_) => ServiceType::Oaf,
        }
    }
}
