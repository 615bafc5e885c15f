//! Identifier policy: opaque OWS identifiers and deterministic OAF external ids.
//!
//! External identifiers are version-5 UUIDs computed by the engine as
//! `uuid5(namespace, '<table>' || col_1 || col_2 ...)`. The seed has no separator
//! between the table name and the first value, nor between values. Changing that
//! changes every identifier ever published, so [`external_fid_seed`] and
//! [`external_fid_expression`] must stay in step.

use uuid::Uuid;

use crate::statement::{quote_identifier, quote_literal};

/// Namespace shared by every external identifier of a deployment.
pub const DEFAULT_NAMESPACE: Uuid = Uuid::from_u128(0x098c4e26_6e36_5693_bae9_df35db0bee49);

/// Column holding the external identifier.
pub const EXTERNAL_FID_COLUMN: &str = "external_fid";
/// Column holding the random per-row identifier (OWS).
pub const OPAQUE_ID_COLUMN: &str = "puuid";
/// Column holding `<table>.<puuid>` (OWS).
pub const COMPOUND_ID_COLUMN: &str = "fuuid";

/// Seed string for an external identifier.
pub fn external_fid_seed<S: AsRef<str>>(table: &str, values: &[S]) -> String {
    let mut seed = String::from(table);
    for value in values {
        seed.push_str(value.as_ref());
    }
    seed
}

/// External identifier for a row, computed the same way the engine does.
pub fn derive_external_fid<S: AsRef<str>>(namespace: &Uuid, table: &str, values: &[S]) -> Uuid {
    Uuid::new_v5(namespace, external_fid_seed(table, values).as_bytes())
}

/// SQL expression concatenating the table name and `columns` into the seed.
///
/// Values are concatenated with SQLite's `||`, so an integer column contributes
/// its decimal text.
pub fn external_fid_seed_expression(table: &str, columns: &[String]) -> String {
    let mut seed = quote_literal(table);
    for column in columns {
        seed.push_str("||");
        seed.push_str(&quote_identifier(column));
    }
    seed
}

/// SQL expression computing the external identifier from `columns`.
pub fn external_fid_expression(namespace: &Uuid, table: &str, columns: &[String]) -> String {
    format!(
        "uuid5({}, {})",
        quote_literal(&namespace.to_string()),
        external_fid_seed_expression(table, columns)
    )
}

/// SQL expression generating a random identifier.
pub fn opaque_id_expression() -> &'static str {
    "uuid4()"
}

/// SQL expression computing `<table>.<puuid>`.
pub fn compound_id_expression(table: &str) -> String {
    format!(
        "{} || {}",
        quote_literal(&format!("{table}.")),
        quote_identifier(OPAQUE_ID_COLUMN)
    )
}
