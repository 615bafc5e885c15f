//! Structural and data statements issued against the geopackage.

use std::fmt;

/// SQL type of an added column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// `TEXT`
    Text,
    /// `NUMERIC`
    Numeric,
}

impl ColumnType {
    /// SQL spelling of the type.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Numeric => "NUMERIC",
        }
    }
}

/// Index to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Index name
    pub name: String,
    /// Indexed table
    pub table: String,
    /// Indexed columns in order
    pub columns: Vec<String>,
    /// Unique index
    pub unique: bool,
}

impl IndexDefinition {
    /// Non-unique index.
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns,
            unique: false,
        }
    }

    /// Unique index.
    pub fn unique(name: impl Into<String>, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            unique: true,
            ..Self::new(name, table, columns)
        }
    }
}

/// A single statement. Rendered to SQL only at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `ALTER TABLE .. ADD COLUMN ..`
    AddColumn {
        /// Table to alter
        table: String,
        /// New column
        column: String,
        /// Column type
        column_type: ColumnType,
    },
    /// `UPDATE .. SET column = expression`, applied to every row
    SetColumnValue {
        /// Table to update
        table: String,
        /// Column to set
        column: String,
        /// SQL expression, evaluated per row
        expression: String,
    },
    /// `CREATE [UNIQUE] INDEX ..`
    CreateIndex(IndexDefinition),
    /// Engine-level statistics refresh
    Analyze,
    /// Free-form statement from configuration, passed through verbatim
    Raw(String),
}

impl Statement {
    /// Add a column.
    pub fn add_column(table: &str, column: &str, column_type: ColumnType) -> Self {
        Statement::AddColumn {
            table: table.to_string(),
            column: column.to_string(),
            column_type,
        }
    }

    /// Set a column from an expression.
    pub fn set_column_value(table: &str, column: &str, expression: impl Into<String>) -> Self {
        Statement::SetColumnValue {
            table: table.to_string(),
            column: column.to_string(),
            expression: expression.into(),
        }
    }

    /// Render the statement as SQL.
    pub fn to_sql(&self) -> String {
        match self {
            Statement::AddColumn {
                table,
                column,
                column_type,
            } => format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                quote_identifier(table),
                quote_identifier(column),
                column_type.as_sql()
            ),
            Statement::SetColumnValue {
                table,
                column,
                expression,
            } => format!(
                "UPDATE {} SET {} = {};",
                quote_identifier(table),
                quote_identifier(column),
                expression
            ),
            Statement::CreateIndex(index) => format!(
                "CREATE {}INDEX {} ON {}({});",
                if index.unique { "UNIQUE " } else { "" },
                quote_identifier(&index.name),
                quote_identifier(&index.table),
                column_list(&index.columns)
            ),
            Statement::Analyze => "ANALYZE;".to_string(),
            Statement::Raw(sql) => sql.clone(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Quote an SQL identifier, doubling embedded double quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote an SQL string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `table.column` with both parts quoted.
pub fn qualified_column(table: &str, column: &str) -> String {
    format!("{}.{}", quote_identifier(table), quote_identifier(column))
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}
