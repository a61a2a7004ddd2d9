//! Oracle target database operations.

#[cfg(test)]
pub(crate) mod memory;

use oracle::sql_type::{OracleType, ToSql};
use oracle::Connection;
use tracing::{debug, info, warn};

use crate::config::{ConnectTarget, OracleConfig};
use crate::core::identifier::quote_oracle;
use crate::core::traits::TargetWriter;
use crate::core::value::SqlValue;
use crate::error::{MigrateError, Result};

/// Oracle target writer over a single session.
pub struct OracleWriter {
    conn: Connection,
}

impl OracleWriter {
    /// Connect to Oracle, trying the service name first and the SID second.
    pub fn connect(config: &OracleConfig) -> Result<Self> {
        let targets = config.connect_targets();
        if targets.is_empty() {
            return Err(MigrateError::Config(
                "either service_name or sid must be specified in [ORACLE]".to_string(),
            ));
        }

        let mut last_error = String::new();
        for target in &targets {
            let connect_string = target.connect_string(&config.host, config.port);
            debug!("Connecting to Oracle via {}", target.describe());

            match Connection::connect(&config.user, &config.password, &connect_string) {
                Ok(conn) => {
                    let version = conn
                        .server_version()
                        .map(|(v, _)| v.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    info!(
                        "Connected to Oracle {} at {}:{} ({})",
                        version,
                        config.host,
                        config.port,
                        target.describe()
                    );
                    return Ok(Self { conn });
                }
                Err(e) => {
                    if matches!(target, ConnectTarget::ServiceName(_)) && targets.len() > 1 {
                        warn!("Connection via {} failed: {}; trying SID", target.describe(), e);
                    }
                    last_error = e.to_string();
                }
            }
        }

        Err(MigrateError::connection(
            format!("Oracle at {}:{}", config.host, config.port),
            last_error,
        ))
    }
}

impl TargetWriter for OracleWriter {
    fn table_exists(&self, table: &str) -> Result<bool> {
        let count = self.conn.query_row_as::<i64>(
            "SELECT COUNT(*) FROM user_tables WHERE table_name = :1",
            &[&table],
        )?;
        Ok(count > 0)
    }

    fn drop_table(&self, table: &str) -> Result<()> {
        if !self.table_exists(table)? {
            return Ok(());
        }
        let sql = format!("DROP TABLE {} PURGE", quote_oracle(table)?);
        debug!("{}", sql);
        self.conn
            .execute(&sql, &[])
            .map_err(|e| MigrateError::schema(table, e.to_string()))?;
        Ok(())
    }

    fn create_table(&self, ddl: &str) -> Result<()> {
        debug!("{}", ddl);
        self.conn.execute(ddl, &[])?;
        Ok(())
    }

    fn write_batch(
        &self,
        table: &str,
        cols: &[String],
        col_types: &[String],
        batch: &[Vec<SqlValue>],
    ) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let sql = build_insert_sql(table, cols)?;
        let mut stmt = self.conn.batch(&sql, batch.len()).build()?;

        for (idx, target_type) in col_types.iter().enumerate() {
            stmt.set_type(idx + 1, &oracle_bind_type(target_type))?;
        }

        for row in batch {
            let params: Vec<Box<dyn ToSql>> = row.iter().map(sql_value_to_param).collect();
            let refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            stmt.append_row(&refs)?;
        }

        finish_batch(table, stmt.execute(), || self.conn.commit(), || {
            self.conn.rollback()
        })?;

        Ok(batch.len() as u64)
    }

    fn db_type(&self) -> &str {
        "oracle"
    }
}

/// Commit an executed batch. When execution failed, roll the session back
/// first: array DML keeps the rows ahead of the failing one pending, and a
/// later commit would otherwise persist them.
fn finish_batch<E: std::fmt::Display>(
    table: &str,
    executed: std::result::Result<(), E>,
    commit: impl FnOnce() -> std::result::Result<(), E>,
    rollback: impl FnOnce() -> std::result::Result<(), E>,
) -> std::result::Result<(), E> {
    match executed {
        Ok(()) => commit(),
        Err(e) => {
            if let Err(rollback_err) = rollback() {
                warn!("Rollback after failed batch on {} failed: {}", table, rollback_err);
            }
            Err(e)
        }
    }
}

/// Build a positional INSERT for one row.
pub fn build_insert_sql(table: &str, cols: &[String]) -> Result<String> {
    let col_list = cols
        .iter()
        .map(|c| quote_oracle(c))
        .collect::<Result<Vec<_>>>()?
        .join(", ");

    let placeholders = (1..=cols.len())
        .map(|i| format!(":{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_oracle(table)?,
        col_list,
        placeholders
    ))
}

/// Bind type for a target column type.
///
/// Binding every row with the column's type keeps a batch consistent even
/// when SQLite hands back mixed storage classes within one column.
pub fn oracle_bind_type(target_type: &str) -> OracleType {
    let upper = target_type.trim().to_uppercase();
    let (base, size) = match upper.split_once('(') {
        Some((base, rest)) => {
            let size = rest
                .trim_end_matches(')')
                .split(',')
                .next()
                .and_then(|s| s.trim().parse::<u32>().ok());
            (base.trim().to_string(), size)
        }
        None => (upper.clone(), None),
    };

    match base.as_str() {
        "NUMBER" => OracleType::Number(0, -127),
        "DATE" => OracleType::Date,
        "TIMESTAMP" => OracleType::Timestamp(6),
        "CHAR" => OracleType::Char(size.unwrap_or(1)),
        "BLOB" => OracleType::BLOB,
        "CLOB" => OracleType::CLOB,
        "RAW" => OracleType::Raw(size.unwrap_or(2000)),
        _ => OracleType::Varchar2(size.unwrap_or(4000)),
    }
}

/// Convert SqlValue to a boxed ToSql parameter.
fn sql_value_to_param(value: &SqlValue) -> Box<dyn ToSql> {
    match value {
        SqlValue::Null => Box::new(None::<String>),
        SqlValue::Integer(n) => Box::new(*n),
        SqlValue::Real(n) => Box::new(*n),
        SqlValue::Text(s) => Box::new(s.clone()),
        SqlValue::Bytes(b) => Box::new(b.clone()),
        SqlValue::DateTime(dt) => Box::new(*dt),
    }
}
