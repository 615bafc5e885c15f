//! OAF planner: external identifiers, temporal and spatial indexes, relations.

use tracing::debug;
use uuid::Uuid;

use crate::catalog::Table;
use crate::config::{LayerConfig, OafConfig, DEFAULT_FID_COLUMN, DEFAULT_GEOM_COLUMN};
use crate::error::OptimizeResult;
use crate::identifier::{external_fid_expression, DEFAULT_NAMESPACE, EXTERNAL_FID_COLUMN};
use crate::plan::{Phase, Plan, SkipReason};
use crate::planner::relations::RelationResolver;
use crate::statement::{quote_identifier, ColumnType, IndexDefinition, Statement};

/// Bounding-box columns and the engine function filling each one.
const BBOX_COLUMNS: [(&str, &str); 4] = [
    ("minx", "ST_MinX"),
    ("maxx", "ST_MaxX"),
    ("miny", "ST_MinY"),
    ("maxy", "ST_MaxY"),
];

/// Plans the OAF optimisation of a geopackage.
#[derive(Debug, Clone, Copy)]
pub struct OafPlanner<'a> {
    config: Option<&'a OafConfig>,
    namespace: Uuid,
}

impl<'a> OafPlanner<'a> {
    /// Planner with optional layer configuration and the default namespace.
    pub fn new(config: Option<&'a OafConfig>) -> Self {
        Self {
            config,
            namespace: DEFAULT_NAMESPACE,
        }
    }

    /// Use another namespace for external identifiers.
    pub fn with_namespace(mut self, namespace: Uuid) -> Self {
        self.namespace = namespace;
        self
    }

    /// Per-table steps, then relations, then one statistics refresh.
    ///
    /// Without configuration every table gets the default spatial treatment.
    pub fn plan(&self, tables: &[Table]) -> OptimizeResult<Plan> {
        let mut plan = Plan::new();

        match self.config {
            None => {
                for table in tables {
                    plan_spatial(table, DEFAULT_FID_COLUMN, DEFAULT_GEOM_COLUMN, None, &mut plan);
                }
            }
            Some(config) => {
                config.validate()?;
                report_unmatched(config, tables, &mut plan);
                for table in tables {
                    match config.layer(&table.name) {
                        Some(layer) => self.plan_layer(table, layer, &mut plan),
                        None => plan.skip(&table.name, SkipReason::NoConfiguration),
                    }
                }
                plan.extend(RelationResolver::new(config).plan(tables)?);
            }
        }

        plan.push_global(Phase::Statistics, Statement::Analyze);
        Ok(plan)
    }

    fn plan_layer(&self, table: &Table, layer: &LayerConfig, plan: &mut Plan) {
        let name = table.name.as_str();
        debug!(table = name, "planning OAF optimizations");

        for sql in &layer.sql_statements {
            plan.push(name, Phase::CustomSql, Statement::Raw(sql.clone()));
        }

        if let Some(columns) = &layer.external_fid_columns {
            plan.push(
                name,
                Phase::ExternalFid,
                Statement::add_column(name, EXTERNAL_FID_COLUMN, ColumnType::Text),
            );
            plan.push(
                name,
                Phase::ExternalFid,
                Statement::set_column_value(
                    name,
                    EXTERNAL_FID_COLUMN,
                    external_fid_expression(&self.namespace, name, columns),
                ),
            );
            plan.push(
                name,
                Phase::ExternalFid,
                Statement::CreateIndex(IndexDefinition::new(
                    format!("{name}_external_fid_idx"),
                    name,
                    vec![EXTERNAL_FID_COLUMN.to_string()],
                )),
            );
        }

        let temporal = layer.temporal_columns();
        if let Some(columns) = temporal {
            plan.push(
                name,
                Phase::Temporal,
                Statement::CreateIndex(IndexDefinition::new(
                    format!("{name}_temporal_idx"),
                    name,
                    columns.to_vec(),
                )),
            );
        }

        plan_spatial(table, &layer.fid_column, &layer.geom_column, temporal, plan);
    }
}

/// Bounding-box columns plus `[fid, minx, maxx, miny, maxy, temporal..]` index.
fn plan_spatial(
    table: &Table,
    fid_column: &str,
    geom_column: &str,
    temporal_columns: Option<&[String]>,
    plan: &mut Plan,
) {
    let name = table.name.as_str();
    if !table.is_feature_table() {
        debug!(table = name, content_type = %table.content_type, "no geometries");
        plan.skip(name, SkipReason::NotFeatureTable);
        return;
    }

    for (column, _) in BBOX_COLUMNS {
        plan.push(
            name,
            Phase::Spatial,
            Statement::add_column(name, column, ColumnType::Numeric),
        );
    }
    for (column, function) in BBOX_COLUMNS {
        plan.push(
            name,
            Phase::Spatial,
            Statement::set_column_value(
                name,
                column,
                format!("{function}({})", quote_identifier(geom_column)),
            ),
        );
    }

    let mut columns = vec![fid_column.to_string()];
    columns.extend(BBOX_COLUMNS.iter().map(|(column, _)| column.to_string()));
    if let Some(temporal) = temporal_columns {
        columns.extend(temporal.iter().cloned());
    }
    plan.push(
        name,
        Phase::Spatial,
        Statement::CreateIndex(IndexDefinition::new(
            format!("{name}_spatial_idx"),
            name,
            columns,
        )),
    );
}

fn report_unmatched(config: &OafConfig, tables: &[Table], plan: &mut Plan) {
    for configured in config.layers.keys() {
        if !tables.iter().any(|table| &table.name == configured) {
            plan.skip(configured, SkipReason::NotInInventory);
        }
    }
}
