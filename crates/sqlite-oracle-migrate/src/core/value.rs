//! SQL value types for data transfer.

use chrono::NaiveDateTime;

/// A single cell moving from the source to the target.
///
/// SQLite has five storage classes (NULL, INTEGER, REAL, TEXT, BLOB); the
/// extra `DateTime` variant holds text that was parsed for a DATE or
/// TIMESTAMP destination column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL.
    Null,

    /// 64-bit signed integer.
    Integer(i64),

    /// 64-bit floating point.
    Real(f64),

    /// Text data.
    Text(String),

    /// Binary data, passed through unchanged.
    Bytes(Vec<u8>),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),
}

/// A batch of rows.
pub type Batch = Vec<Vec<SqlValue>>;

impl From<rusqlite::types::ValueRef<'_>> for SqlValue {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;

        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(v) => SqlValue::Integer(v),
            ValueRef::Real(v) => SqlValue::Real(v),
            ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => SqlValue::Bytes(bytes.to_vec()),
        }
    }
}
