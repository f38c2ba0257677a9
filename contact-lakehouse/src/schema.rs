//! Arrow schema definitions for the lakehouse Delta tables
//!
//! Each table has an Arrow `Schema` for RecordBatch construction and the
//! matching Delta `StructField`s for table creation. Column order is shared
//! by both and by the row decoders in `auth` and `contact`.

use deltalake::arrow::array::{Array, BooleanArray, RecordBatch, StringArray};
use deltalake::arrow::datatypes::{DataType, Field, Schema};
use deltalake::kernel::{DataType as DeltaDataType, PrimitiveType, StructField};

use crate::error::{LakehouseError, Result};

// ─── Table Names (constants) ───

pub const TABLE_USERS: &str = "users";
pub const TABLE_SESSIONS: &str = "sessions";
pub const TABLE_CONTACT_MESSAGES: &str = "contact_messages";

/// Column layout: (name, is_boolean, nullable)
type Columns = &'static [(&'static str, bool, bool)];

const USERS_COLUMNS: Columns = &[
    ("user_id", false, false),
    ("name", false, false),
    ("email", false, false),
    ("password_hash", false, false),
    ("role", false, false),
    ("created_at", false, false),
];

const SESSIONS_COLUMNS: Columns = &[
    ("token_hash", false, false),
    ("user_id", false, false),
    ("created_at", false, false),
    ("expires_at", false, false),
    ("is_revoked", true, false),
];

const CONTACT_MESSAGES_COLUMNS: Columns = &[
    ("id", false, false),
    ("email", false, false),
    ("subject", false, false),
    ("message", false, false),
    ("created_at", false, false),
];

fn arrow_schema(columns: Columns) -> Schema {
    Schema::new(
        columns
            .iter()
            .map(|(name, is_bool, nullable)| {
                let dt = if *is_bool { DataType::Boolean } else { DataType::Utf8 };
                Field::new(*name, dt, *nullable)
            })
            .collect::<Vec<_>>(),
    )
}

fn delta_fields(columns: Columns) -> Vec<StructField> {
    columns
        .iter()
        .map(|(name, is_bool, nullable)| {
            let pt = if *is_bool { PrimitiveType::Boolean } else { PrimitiveType::String };
            StructField::new(*name, DeltaDataType::Primitive(pt), *nullable)
        })
        .collect()
}

/// Arrow schema for the `users` Delta table
pub fn users_arrow_schema() -> Schema {
    arrow_schema(USERS_COLUMNS)
}

/// Arrow schema for the `sessions` Delta table
pub fn sessions_arrow_schema() -> Schema {
    arrow_schema(SESSIONS_COLUMNS)
}

/// Arrow schema for the `contact_messages` Delta table
pub fn contact_messages_arrow_schema() -> Schema {
    arrow_schema(CONTACT_MESSAGES_COLUMNS)
}

/// Table definition bundle for `DeltaStore::ensure_table`
pub struct TableDefinition {
    pub name: &'static str,
    pub delta_fields: Vec<StructField>,
    pub partition_columns: Vec<String>,
}

/// Get all table definitions for lakehouse initialization
///
/// None of the tables are partitioned: all lookups are by key.
pub fn all_tables() -> Vec<TableDefinition> {
    [
        (TABLE_USERS, USERS_COLUMNS),
        (TABLE_SESSIONS, SESSIONS_COLUMNS),
        (TABLE_CONTACT_MESSAGES, CONTACT_MESSAGES_COLUMNS),
    ]
    .into_iter()
    .map(|(name, columns)| TableDefinition {
        name,
        delta_fields: delta_fields(columns),
        partition_columns: vec![],
    })
    .collect()
}

/// Quote a value as a SQL string literal for Delta predicates
///
/// Single quotes are doubled so caller-supplied identifiers cannot escape
/// the literal.
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// ─── Row Access ───

/// Iterate `(batch, row_index)` over every row of a query result
pub(crate) fn rows(batches: &[RecordBatch]) -> impl Iterator<Item = (&RecordBatch, usize)> {
    batches
        .iter()
        .flat_map(|b| (0..b.num_rows()).map(move |i| (b, i)))
}

/// Read a non-null Utf8 cell
pub(crate) fn string_at(batch: &RecordBatch, col: usize, row: usize) -> Result<String> {
    let array = batch
        .column(col)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| {
            LakehouseError::Internal(format!("Schema error: column {col} is not Utf8"))
        })?;
    if array.is_null(row) {
        return Err(LakehouseError::Internal(format!("Schema error: column {col} is null")));
    }
    Ok(array.value(row).to_string())
}

/// Read a non-null Boolean cell
pub(crate) fn bool_at(batch: &RecordBatch, col: usize, row: usize) -> Result<bool> {
    batch
        .column(col)
        .as_any()
        .downcast_ref::<BooleanArray>()
        .filter(|a| !a.is_null(row))
        .map(|a| a.value(row))
        .ok_or_else(|| {
            LakehouseError::Internal(format!("Schema error: column {col} is not Boolean"))
        })
}
