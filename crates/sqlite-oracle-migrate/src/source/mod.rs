//! SQLite source reader.

pub mod ddl;

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::core::identifier::quote_sqlite;
use crate::core::schema::{Column, Table};
use crate::core::traits::SourceReader;
use crate::core::value::SqlValue;
use crate::error::{MigrateError, Result};

pub use ddl::extract_column_type;

/// Reads schema and rows from a SQLite database.
pub struct SqliteReader {
    conn: Connection,
}

impl SqliteReader {
    /// Open a SQLite database file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MigrateError::connection(
                "SQLite",
                format!("database '{}' not found", path.display()),
            ));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| MigrateError::connection("SQLite", e.to_string()))?;

        let version: String = conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        info!("Connected to SQLite {}: {}", version, path.display());

        Ok(Self { conn })
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Fetch the `CREATE TABLE` statement stored in `sqlite_master`.
    fn table_ddl(&self, name: &str) -> Result<Option<String>> {
        let ddl: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ddl.flatten())
    }

    fn row_count(&self, name: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_sqlite(name)?);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }
}

impl SourceReader for SqliteReader {
    fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY rowid",
        )?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    fn describe_table(&self, name: &str) -> Result<Table> {
        let ddl = self.table_ddl(name)?;

        let sql = format!("PRAGMA table_info({})", quote_sqlite(name)?);
        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| {
                Ok(Column {
                    ordinal_pos: row.get(0)?,
                    name: row.get(1)?,
                    data_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    is_nullable: row.get::<_, i64>(3)? == 0,
                    is_primary_key: row.get::<_, i64>(5)? > 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(MigrateError::SchemaExtraction(format!(
                "table {} has no columns",
                name
            )));
        }

        // Prefer the type token from the stored statement when it has one.
        let columns = columns
            .into_iter()
            .map(|mut col| {
                if let Some(declared) = ddl
                    .as_deref()
                    .and_then(|ddl| extract_column_type(ddl, &col.name))
                {
                    if declared != col.data_type {
                        debug!(
                            "{}.{}: using DDL type '{}' over '{}'",
                            name, col.name, declared, col.data_type
                        );
                    }
                    col.data_type = declared;
                }
                col
            })
            .collect();

        let row_count = self.row_count(name)?;

        Ok(Table {
            name: name.to_string(),
            columns,
            row_count,
            ddl,
        })
    }

    fn read_rows(
        &self,
        table: &Table,
        on_row: &mut dyn FnMut(Vec<SqlValue>) -> Result<()>,
    ) -> Result<u64> {
        let col_list = table
            .columns
            .iter()
            .map(|c| quote_sqlite(&c.name))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let sql = format!("SELECT {} FROM {}", col_list, quote_sqlite(&table.name)?);

        let mut stmt = self.conn.prepare(&sql)?;
        let col_count = stmt.column_count();
        let mut rows = stmt.query([])?;
        let mut read = 0u64;

        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(col_count);
            for idx in 0..col_count {
                values.push(SqlValue::from(row.get_ref(idx)?));
            }
            on_row(values)?;
            read += 1;
        }

        Ok(read)
    }

    fn db_type(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_with(sql: &str) -> SqliteReader {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        SqliteReader::from_connection(conn)
    }

    #[test]
    fn test_list_tables_skips_internal() {
        let reader = reader_with(
            "CREATE TABLE b (id INTEGER PRIMARY KEY AUTOINCREMENT);
             CREATE TABLE a (id INTEGER);",
        );
        // AUTOINCREMENT creates sqlite_sequence, which must be hidden.
        assert_eq!(reader.list_tables().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_describe_table_refines_types_from_ddl() {
        let reader = reader_with(
            "CREATE TABLE \"Order Items\" (
                id INTEGER PRIMARY KEY,
                price NUMBER(9,2) NOT NULL,
                note,
                qty int
             );
             INSERT INTO \"Order Items\" (id, price, qty) VALUES (1, 9.5, 2), (2, 1.25, 1);",
        );

        let table = reader.describe_table("Order Items").unwrap();
        assert_eq!(table.name, "Order Items");
        assert_eq!(table.row_count, 2);
        assert!(table.ddl.as_deref().unwrap().contains("NUMBER(9,2)"));

        let cols = &table.columns;
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0].name, "id");
        assert!(cols[0].is_primary_key);
        assert_eq!(cols[1].data_type, "NUMBER(9,2)");
        assert!(!cols[1].is_nullable);
        assert_eq!(cols[2].data_type, "");
        assert_eq!(cols[3].data_type, "int");
        assert_eq!(cols[3].ordinal_pos, 3);
    }

    #[test]
    fn test_extract_schema_describes_every_table() {
        let reader = reader_with(
            "CREATE TABLE a (x TEXT); CREATE TABLE b (y REAL); INSERT INTO b VALUES (1.0);",
        );
        let tables = reader.extract_schema().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].row_count, 0);
        assert_eq!(tables[0].row_count, 0);
        assert_eq!(tables[1].row_count, 1);
    }

    #[test]
    fn test_read_rows_preserves_order_and_types() {
        let reader = reader_with(
            "CREATE TABLE t (a INTEGER, b TEXT, c BLOB, d REAL);
             INSERT INTO t VALUES (1, 'x', X'00FF', NULL);
             INSERT INTO t VALUES (2, NULL, NULL, 2.5);",
        );
        let table = reader.describe_table("t").unwrap();

        let mut rows = Vec::new();
        let read = reader
            .read_rows(&table, &mut |row| {
                rows.push(row);
                Ok(())
            })
            .unwrap();

        assert_eq!(read, 2);
        assert_eq!(
            rows[0],
            vec![
                SqlValue::Integer(1),
                SqlValue::Text("x".to_string()),
                SqlValue::Bytes(vec![0x00, 0xFF]),
                SqlValue::Null,
            ]
        );
        assert_eq!(
            rows[1],
            vec![
                SqlValue::Integer(2),
                SqlValue::Null,
                SqlValue::Null,
                SqlValue::Real(2.5),
            ]
        );
    }

    #[test]
    fn test_read_rows_stops_on_callback_error() {
        let reader = reader_with("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (2), (3);");
        let table = reader.describe_table("t").unwrap();
        let mut seen = 0;
        let result = reader.read_rows(&table, &mut |_| {
            seen += 1;
            Err(MigrateError::transfer("t", "stop"))
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_open_missing_file() {
        let err = SqliteReader::open("/nonexistent/data.db").err().unwrap();
        assert!(matches!(err, MigrateError::Connection { .. }));
    }

    #[test]
    fn test_open_file_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE t (a INTEGER);").unwrap();
        }
        let reader = SqliteReader::open(&path).unwrap();
        assert_eq!(reader.list_tables().unwrap(), vec!["t"]);
        assert_eq!(reader.db_type(), "sqlite");
    }
}
