use std::fs;
use std::path::Path;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// Declarative table-definition document, shipped as JSON next to the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDoc {
    pub tables: Vec<TableSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub table_name: String,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub constraints: String,
}

pub fn load_schema_doc(path: &Path) -> PoolResult<SchemaDoc> {
    let raw = fs::read_to_string(path).map_err(|err| {
        PoolError::Configuration(format!("read schema document {}: {err}", path.display()))
    })?;
    serde_json::from_str::<SchemaDoc>(&raw).map_err(|err| {
        PoolError::Configuration(format!("parse schema document {}: {err}", path.display()))
    })
}

/// Create every table in the document if it does not already exist.
///
/// Idempotent: running twice leaves the same set of tables as running once.
/// All DDL runs in a single batch so a reachable store either applies the
/// whole document or none of it.
pub fn apply_schema(conn: &Connection, doc: &SchemaDoc) -> PoolResult<()> {
    let mut batch = String::from("BEGIN;\n");
    for table in &doc.tables {
        batch.push_str(&create_table_sql(table)?);
        batch.push('\n');
    }
    batch.push_str("COMMIT;");
    conn.execute_batch(&batch)?;
    Ok(())
}

/// Build one `CREATE TABLE IF NOT EXISTS` statement from a spec.
///
/// SQLite cannot bind identifiers as parameters, so every identifier and
/// type/constraint fragment is validated before interpolation and anything
/// outside the allowed shape is rejected.
pub fn create_table_sql(table: &TableSpec) -> PoolResult<String> {
    check_identifier(&table.table_name)?;
    if table.columns.is_empty() {
        return Err(PoolError::Validation(format!(
            "table {} has no columns",
            table.table_name
        )));
    }

    let mut parts = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        check_identifier(&column.name)?;
        check_fragment(&column.column_type, "column type")?;
        check_fragment(&column.constraints, "column constraints")?;
        let mut def = format!("{} {}", column.name, column.column_type.trim());
        let constraints = column.constraints.trim();
        if !constraints.is_empty() {
            def.push(' ');
            def.push_str(constraints);
        }
        parts.push(def);
    }

    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} ({}",
        table.table_name,
        parts.join(", ")
    );
    if !table.primary_key.is_empty() {
        for key in &table.primary_key {
            check_identifier(key)?;
        }
        sql.push_str(&format!(", PRIMARY KEY ({})", table.primary_key.join(", ")));
    }
    sql.push_str(");");
    Ok(sql)
}

fn check_identifier(name: &str) -> PoolResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PoolError::Validation(format!(
            "invalid SQL identifier {name:?}"
        )))
    }
}

// Types and constraints are keyword-ish fragments ("INTEGER", "NOT NULL"),
// never quoted values.
fn check_fragment(fragment: &str, what: &str) -> PoolResult<()> {
    if fragment
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '_' | '(' | ')' | ','))
    {
        Ok(())
    } else {
        Err(PoolError::Validation(format!(
            "invalid {what} {fragment:?}"
        )))
    }
}
