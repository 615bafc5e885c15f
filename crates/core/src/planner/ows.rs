//! OWS planner: opaque per-row identifiers plus configured indexes.

use tracing::debug;

use crate::catalog::Table;
use crate::config::OwsConfig;
use crate::error::OptimizeResult;
use crate::identifier::{
    compound_id_expression, opaque_id_expression, COMPOUND_ID_COLUMN, OPAQUE_ID_COLUMN,
};
use crate::plan::{Phase, Plan};
use crate::statement::{ColumnType, IndexDefinition, Statement};

/// Plans the OWS optimisation of a geopackage.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwsPlanner<'a> {
    config: Option<&'a OwsConfig>,
}

impl<'a> OwsPlanner<'a> {
    /// Planner with optional manual index configuration.
    pub fn new(config: Option<&'a OwsConfig>) -> Self {
        Self { config }
    }

    /// Identifier columns for every table, the manual indexes, then one
    /// statistics refresh.
    ///
    /// Manual index names are validated before any index is planned, so a
    /// collision never leaves a partially created set behind.
    pub fn plan(&self, tables: &[Table]) -> OptimizeResult<Plan> {
        let mut plan = Plan::new();
        for table in tables {
            plan_identifiers(&table.name, &mut plan);
        }
        if let Some(config) = self.config {
            plan_manual_indexes(config, &mut plan)?;
        }
        plan.push_global(Phase::Statistics, Statement::Analyze);
        Ok(plan)
    }
}

/// `puuid` must be filled before `fuuid`, whose value is derived from it.
fn plan_identifiers(table: &str, plan: &mut Plan) {
    debug!(table, "planning OWS identifiers");

    plan.push(
        table,
        Phase::OpaqueId,
        Statement::add_column(table, OPAQUE_ID_COLUMN, ColumnType::Text),
    );
    plan.push(
        table,
        Phase::OpaqueId,
        Statement::set_column_value(table, OPAQUE_ID_COLUMN, opaque_id_expression()),
    );
    plan.push(
        table,
        Phase::OpaqueId,
        Statement::CreateIndex(IndexDefinition::unique(
            format!("{table}_{OPAQUE_ID_COLUMN}_idx"),
            table,
            vec![OPAQUE_ID_COLUMN.to_string()],
        )),
    );

    plan.push(
        table,
        Phase::CompoundId,
        Statement::add_column(table, COMPOUND_ID_COLUMN, ColumnType::Text),
    );
    plan.push(
        table,
        Phase::CompoundId,
        Statement::set_column_value(table, COMPOUND_ID_COLUMN, compound_id_expression(table)),
    );
    plan.push(
        table,
        Phase::CompoundId,
        Statement::CreateIndex(IndexDefinition::unique(
            format!("{table}_{COMPOUND_ID_COLUMN}_idx"),
            table,
            vec![COMPOUND_ID_COLUMN.to_string()],
        )),
    );
}

/// Plan the configured indexes after checking the whole set.
pub fn plan_manual_indexes(config: &OwsConfig, plan: &mut Plan) -> OptimizeResult<()> {
    config.validate()?;
    for index in &config.indices {
        plan.push(
            &index.table,
            Phase::ManualIndex,
            Statement::CreateIndex(IndexDefinition {
                name: index.name.clone(),
                table: index.table.clone(),
                columns: index.columns.clone(),
                unique: index.unique,
            }),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManualIndex;
    use crate::error::OptimizeError;

    fn index(name: &str, table: &str, unique: bool, columns: &[&str]) -> ManualIndex {
        ManualIndex {
            name: name.into(),
            table: table.into(),
            unique,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_identifier_steps_in_order() {
        let plan = OwsPlanner::new(None)
            .plan(&[Table::features("pand")])
            .unwrap();
        assert_eq!(
            plan.sql(),
            vec![
                r#"ALTER TABLE "pand" ADD COLUMN "puuid" TEXT;"#,
                r#"UPDATE "pand" SET "puuid" = uuid4();"#,
                r#"CREATE UNIQUE INDEX "pand_puuid_idx" ON "pand"("puuid");"#,
                r#"ALTER TABLE "pand" ADD COLUMN "fuuid" TEXT;"#,
                r#"UPDATE "pand" SET "fuuid" = 'pand.' || "puuid";"#,
                r#"CREATE UNIQUE INDEX "pand_fuuid_idx" ON "pand"("fuuid");"#,
                "ANALYZE;",
            ]
        );
    }

    #[test]
    fn test_every_table_gets_identifiers() {
        let tables = [Table::features("pand"), Table::attributes("status")];
        let plan = OwsPlanner::new(None).plan(&tables).unwrap();
        assert_eq!(plan.steps_for("pand").count(), 6);
        assert_eq!(plan.steps_for("status").count(), 6);
    }

    #[test]
    fn test_manual_indexes_follow_identifiers() {
        let config = OwsConfig {
            indices: vec![
                index("pand_bouwjaar_idx", "pand", false, &["bouwjaar"]),
                index("pand_ident_idx", "pand", true, &["identificatie", "versie"]),
            ],
        };
        let plan = OwsPlanner::new(Some(&config))
            .plan(&[Table::features("pand")])
            .unwrap();
        let sql = plan.sql();
        assert_eq!(sql.len(), 9);
        assert_eq!(sql[6], r#"CREATE INDEX "pand_bouwjaar_idx" ON "pand"("bouwjaar");"#);
        assert_eq!(
            sql[7],
            r#"CREATE UNIQUE INDEX "pand_ident_idx" ON "pand"("identificatie", "versie");"#
        );
        assert!(plan.steps()[6..8].iter().all(|s| s.phase == Phase::ManualIndex));
        assert_eq!(plan.steps()[8].statement, Statement::Analyze);
    }

    #[test]
    fn test_duplicate_names_plan_nothing() {
        let config = OwsConfig {
            indices: vec![
                index("dup", "pand", false, &["a"]),
                index("other", "pand", false, &["b"]),
                index("dup", "weg", false, &["c"]),
            ],
        };
        let mut plan = Plan::new();
        let err = plan_manual_indexes(&config, &mut plan).unwrap_err();
        assert!(matches!(err, OptimizeError::DuplicateIndexName(name) if name == "dup"));
        assert!(plan.is_empty());
    }
}
