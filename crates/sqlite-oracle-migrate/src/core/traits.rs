//! Core traits for the migration pipeline.
//!
//! - [`SourceReader`]: reads schema and rows from the source database
//! - [`TargetWriter`]: creates tables and writes batches to the target
//! - [`TypeMapper`]: maps column types between the two dialects
//!
//! All traits are synchronous; the pipeline runs one table and one batch at
//! a time.

use crate::error::Result;

use super::schema::{Column, Table};
use super::value::SqlValue;

/// Read schema and data from a source database.
pub trait SourceReader: Send {
    /// List user tables in creation order.
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Load column metadata, DDL and row count for one table.
    fn describe_table(&self, name: &str) -> Result<Table>;

    /// Extract metadata for every user table.
    fn extract_schema(&self) -> Result<Vec<Table>> {
        self.list_tables()?
            .iter()
            .map(|name| self.describe_table(name))
            .collect()
    }

    /// Stream every row of `table` in column order into `on_row`.
    ///
    /// Stops at the first error returned by `on_row` and propagates it.
    /// Returns the number of rows read.
    fn read_rows(
        &self,
        table: &Table,
        on_row: &mut dyn FnMut(Vec<SqlValue>) -> Result<()>,
    ) -> Result<u64>;

    /// Get the database type identifier (e.g., "sqlite").
    fn db_type(&self) -> &str;
}

/// Write schema and data to a target database.
///
/// Table names passed here are already normalized and unquoted; the
/// implementation is responsible for quoting.
pub trait TargetWriter: Send {
    /// Check if a table exists in the connected schema.
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Drop a table, releasing its storage.
    fn drop_table(&self, table: &str) -> Result<()>;

    /// Execute a `CREATE TABLE` statement.
    fn create_table(&self, ddl: &str) -> Result<()>;

    /// Insert a batch of rows as one bulk operation and commit it.
    ///
    /// `col_types` holds the target type of each column so the writer can
    /// bind values consistently across rows.
    fn write_batch(
        &self,
        table: &str,
        cols: &[String],
        col_types: &[String],
        batch: &[Vec<SqlValue>],
    ) -> Result<u64>;

    /// Get the database type identifier (e.g., "oracle").
    fn db_type(&self) -> &str;
}

/// Maps column types from a source dialect to a target dialect.
pub trait TypeMapper: Send + Sync {
    /// Get the source dialect name.
    fn source_dialect(&self) -> &str;

    /// Get the target dialect name.
    fn target_dialect(&self) -> &str;

    /// Map a source type string to a target type string.
    fn map_type(&self, data_type: &str) -> TypeMapping;

    /// Map a column definition from source to target.
    fn map_column(&self, col: &Column) -> ColumnMapping {
        let mapping = self.map_type(&col.data_type);
        ColumnMapping {
            name: col.name.clone(),
            target_type: mapping.target_type,
            is_nullable: col.is_nullable,
            warning: mapping.warning,
        }
    }
}

/// Result of mapping a column from source to target.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Source column name.
    pub name: String,
    /// Target data type string.
    pub target_type: String,
    /// Whether the column is nullable.
    pub is_nullable: bool,
    /// Warning message if the mapping is lossy.
    pub warning: Option<String>,
}

/// Result of mapping a type from source to target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target type string (e.g., "NUMBER(10,2)", "VARCHAR2(4000)").
    pub target_type: String,
    /// Whether this mapping loses data or precision.
    pub is_lossy: bool,
    /// Warning message for lossy mappings.
    pub warning: Option<String>,
    /// Name of the mapping rule that produced this result.
    pub rule: &'static str,
}

impl TypeMapping {
    /// Create a lossless type mapping.
    pub fn lossless(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: false,
            warning: None,
            rule: "",
        }
    }

    /// Create a lossy type mapping with a warning.
    pub fn lossy(target_type: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: true,
            warning: Some(warning.into()),
            rule: "",
        }
    }

    /// Record which rule produced the mapping.
    pub fn with_rule(mut self, rule: &'static str) -> Self {
        self.rule = rule;
        self
    }
}
