//! Source schema metadata types.

use serde::{Deserialize, Serialize};

/// Table metadata read from the source database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Table name as stored in the source.
    pub name: String,

    /// Column definitions in ordinal order.
    pub columns: Vec<Column>,

    /// Row count at inspection time.
    pub row_count: i64,

    /// Stored `CREATE TABLE` statement, if the source keeps one.
    pub ddl: Option<String>,
}

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Ordinal position (0-based).
    pub ordinal_pos: i32,

    /// Column name.
    pub name: String,

    /// Declared type, refined from the table DDL when possible
    /// (e.g. "NUMBER(9,2)", "TEXT", or empty when undeclared).
    pub data_type: String,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Whether the column is part of the primary key.
    pub is_primary_key: bool,
}
