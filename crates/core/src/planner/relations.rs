//! Relation resolution: links rows to the `external_fid` of rows in other tables.
//!
//! Runs as a separate pass after every table had its external identifier
//! planned, so a relation may point at any table regardless of inventory order.

use tracing::debug;

use crate::catalog::Table;
use crate::config::{OafConfig, Relation};
use crate::error::OptimizeResult;
use crate::identifier::EXTERNAL_FID_COLUMN;
use crate::plan::{Phase, Plan};
use crate::statement::{qualified_column, quote_identifier, ColumnType, Statement};

/// Alias of the target table inside the lookup, so self-relations stay unambiguous.
const TARGET_ALIAS: &str = "relation_target";

/// Plans relation columns for every table that has both an external
/// identifier and relations.
#[derive(Debug, Clone, Copy)]
pub struct RelationResolver<'a> {
    config: &'a OafConfig,
}

impl<'a> RelationResolver<'a> {
    /// Resolver over an OAF configuration.
    pub fn new(config: &'a OafConfig) -> Self {
        Self { config }
    }

    /// Relation steps in inventory order, relations in declared order.
    ///
    /// Each relation is validated right before it is planned.
    pub fn plan(&self, tables: &[Table]) -> OptimizeResult<Plan> {
        let mut plan = Plan::new();
        for table in tables {
            let Some(layer) = self.config.layer(&table.name) else {
                continue;
            };
            if !layer.has_external_fid() || layer.relations.is_empty() {
                continue;
            }
            for relation in &layer.relations {
                plan_relation(&table.name, relation, &mut plan)?;
            }
        }
        Ok(plan)
    }
}

fn plan_relation(table: &str, relation: &Relation, plan: &mut Plan) -> OptimizeResult<()> {
    relation.validate(table)?;

    let column = relation.column_name();
    debug!(table, target = %relation.table, column = %column, "planning relation");

    plan.push(
        table,
        Phase::Relation,
        Statement::add_column(table, &column, ColumnType::Text),
    );
    plan.push(
        table,
        Phase::Relation,
        Statement::set_column_value(table, &column, lookup_expression(table, relation)),
    );
    Ok(())
}

/// `table.fk_1 = target.pk_1 AND table.fk_2 = target.pk_2 ...` in key order.
pub fn join_predicate(table: &str, relation: &Relation) -> String {
    relation
        .keys()
        .iter()
        .map(|key| {
            format!(
                "{} = {}",
                qualified_column(table, &key.foreign_key),
                qualified_column(TARGET_ALIAS, &key.primary_key)
            )
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Correlated lookup of the target's `external_fid`; yields NULL without a match.
pub fn lookup_expression(table: &str, relation: &Relation) -> String {
    format!(
        "(SELECT {} FROM {} AS {} WHERE {})",
        qualified_column(TARGET_ALIAS, EXTERNAL_FID_COLUMN),
        quote_identifier(&relation.table),
        quote_identifier(TARGET_ALIAS),
        join_predicate(table, relation)
    )
}
