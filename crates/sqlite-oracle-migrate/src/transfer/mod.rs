//! Row copier.
//!
//! Streams rows out of the source table, converts cells for their target
//! column, and writes them to the target in fixed-size batches. Each batch
//! is one bulk insert followed by a commit, so a failure part way through a
//! table leaves the earlier batches in place.

pub mod dates;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::schema::Table;
use crate::core::traits::{SourceReader, TargetWriter};
use crate::core::value::{Batch, SqlValue};
use crate::error::{MigrateError, Result};
use crate::schema::TablePlan;

pub use dates::{parse_date, DATE_FORMATS};

/// Copy job for a single table.
#[derive(Debug, Clone)]
pub struct TransferJob {
    /// Source table metadata.
    pub table: Table,

    /// Destination plan for the table.
    pub plan: TablePlan,
}

/// Statistics from a transfer job.
#[derive(Debug, Clone, Default)]
pub struct TransferStats {
    /// Total rows written.
    pub rows: u64,

    /// Bulk inserts submitted.
    pub batches: u64,

    /// Time spent reading and converting rows.
    pub read_time: Duration,

    /// Time spent in bulk inserts and commits.
    pub write_time: Duration,
}

/// Progress after a committed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Destination table name.
    pub table: String,
    /// Rows committed so far.
    pub rows_copied: u64,
    /// Rows counted in the source before the copy started.
    pub rows_total: i64,
    /// Batches committed so far.
    pub batches: u64,
    pub percent: f64,
}

/// Receives a [`ProgressUpdate`] after every batch.
pub type ProgressCallback = Arc<dyn Fn(&ProgressUpdate) + Send + Sync>;

/// How a cell is prepared for its target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellConversion {
    /// Parse text with [`DATE_FORMATS`].
    DateTime,
    /// Reject text longer than this many bytes.
    MaxBytes(usize),
    Passthrough,
}

impl CellConversion {
    fn for_target_type(target_type: &str) -> Self {
        let upper = target_type.trim().to_uppercase();
        if upper == "DATE" || upper == "TIMESTAMP" {
            return CellConversion::DateTime;
        }

        let size = upper
            .strip_prefix("VARCHAR2(")
            .or_else(|| upper.strip_prefix("CHAR("))
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|n| n.trim().parse::<usize>().ok());

        match size {
            Some(n) => CellConversion::MaxBytes(n),
            None => CellConversion::Passthrough,
        }
    }
}

/// Copies table data from a source reader to a target writer.
pub struct TransferEngine<'a> {
    source: &'a dyn SourceReader,
    target: &'a dyn TargetWriter,
    batch_size: usize,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl<'a> TransferEngine<'a> {
    /// Create a new transfer engine.
    pub fn new(
        source: &'a dyn SourceReader,
        target: &'a dyn TargetWriter,
        batch_size: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            target,
            batch_size: batch_size.max(1),
            cancel,
            progress: None,
        }
    }

    /// Report progress after each batch.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Copy every row of the job's table.
    ///
    /// N rows with batch size B take `ceil(N / B)` bulk inserts; an empty
    /// table takes none.
    pub fn execute(&self, job: &TransferJob) -> Result<TransferStats> {
        let table_name = job.plan.target_name.as_str();
        info!(
            "{}: copying {} rows (batch size {})",
            table_name, job.table.row_count, self.batch_size
        );

        let start = Instant::now();
        let mut stats = TransferStats::default();

        let columns = job.plan.target_columns();
        let col_types = job.plan.target_types();
        let conversions: Vec<CellConversion> = col_types
            .iter()
            .map(|t| CellConversion::for_target_type(t))
            .collect();

        let mut buffer: Batch = Vec::with_capacity(self.batch_size);
        let mut row_num = 0u64;

        self.source.read_rows(&job.table, &mut |row| {
            if self.cancel.is_cancelled() {
                return Err(MigrateError::Cancelled);
            }
            row_num += 1;

            buffer.push(convert_row(job, &conversions, row, row_num)?);
            if buffer.len() >= self.batch_size {
                self.flush(job, &columns, &col_types, &mut buffer, &mut stats)?;
            }
            Ok(())
        })?;

        if !buffer.is_empty() {
            self.flush(job, &columns, &col_types, &mut buffer, &mut stats)?;
        }

        let elapsed = start.elapsed();
        stats.read_time = elapsed.saturating_sub(stats.write_time);

        let rows_per_sec = if elapsed.as_secs_f64() > 0.0 {
            (stats.rows as f64 / elapsed.as_secs_f64()) as u64
        } else {
            0
        };

        info!(
            "{}: transferred {} rows in {:?} ({} rows/sec, read: {:?}, write: {:?})",
            table_name, stats.rows, elapsed, rows_per_sec, stats.read_time, stats.write_time
        );

        Ok(stats)
    }

    fn flush(
        &self,
        job: &TransferJob,
        columns: &[String],
        col_types: &[String],
        buffer: &mut Batch,
        stats: &mut TransferStats,
    ) -> Result<()> {
        let table_name = job.plan.target_name.as_str();
        let write_start = Instant::now();
        let written = self
            .target
            .write_batch(table_name, columns, col_types, buffer)?;
        stats.write_time += write_start.elapsed();
        stats.rows += written;
        stats.batches += 1;
        buffer.clear();

        let total = job.table.row_count;
        let percent = if total > 0 {
            (stats.rows as f64 / total as f64 * 100.0).min(100.0)
        } else {
            100.0
        };

        info!(
            "{}: {}/{} rows ({:.1}%)",
            table_name, stats.rows, total, percent
        );

        if let Some(progress) = &self.progress {
            progress(&ProgressUpdate {
                table: table_name.to_string(),
                rows_copied: stats.rows,
                rows_total: total,
                batches: stats.batches,
                percent,
            });
        }

        Ok(())
    }
}

fn convert_row(
    job: &TransferJob,
    conversions: &[CellConversion],
    row: Vec<SqlValue>,
    row_num: u64,
) -> Result<Vec<SqlValue>> {
    row.into_iter()
        .zip(conversions)
        .enumerate()
        .map(|(idx, (value, conversion))| match (value, conversion) {
            (SqlValue::Text(s), CellConversion::DateTime) => match parse_date(&s) {
                Some(dt) => Ok(SqlValue::DateTime(dt)),
                None => {
                    debug!(
                        "{}: row {}: '{}' matches no date format, passing as text",
                        job.plan.target_name, row_num, s
                    );
                    Ok(SqlValue::Text(s))
                }
            },
            (SqlValue::Text(s), CellConversion::MaxBytes(max)) if s.len() > *max => {
                let column = job
                    .plan
                    .columns
                    .get(idx)
                    .map(|c| c.target_name.as_str())
                    .unwrap_or("?");
                Err(MigrateError::transfer(
                    job.plan.target_name.as_str(),
                    format!(
                        "row {}: value of {} bytes exceeds {} bytes allowed in column {}",
                        row_num,
                        s.len(),
                        max,
                        column
                    ),
                ))
            }
            (value, _) => Ok(value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TablePlan;
    use crate::source::SqliteReader;
    use crate::target::memory::MemoryWriter;
    use crate::typemap::SqliteToOracleMapper;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn reader_with(sql: &str) -> SqliteReader {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        SqliteReader::from_connection(conn)
    }

    fn job_for(reader: &SqliteReader, table: &str) -> TransferJob {
        let table = reader.describe_table(table).unwrap();
        let plan = TablePlan::from_table(&table, true, &SqliteToOracleMapper::new());
        TransferJob { table, plan }
    }

    fn numbers(n: usize) -> SqliteReader {
        let mut sql = String::from("CREATE TABLE nums (n INTEGER);");
        for i in 0..n {
            sql.push_str(&format!("INSERT INTO nums VALUES ({});", i));
        }
        reader_with(&sql)
    }

    #[test]
    fn test_conversion_for_target_type() {
        assert_eq!(CellConversion::for_target_type("DATE"), CellConversion::DateTime);
        assert_eq!(
            CellConversion::for_target_type("TIMESTAMP"),
            CellConversion::DateTime
        );
        assert_eq!(
            CellConversion::for_target_type("VARCHAR2(4000)"),
            CellConversion::MaxBytes(4000)
        );
        assert_eq!(
            CellConversion::for_target_type("CHAR(1)"),
            CellConversion::MaxBytes(1)
        );
        assert_eq!(
            CellConversion::for_target_type("NUMBER(9,2)"),
            CellConversion::Passthrough
        );
        assert_eq!(CellConversion::for_target_type("BLOB"), CellConversion::Passthrough);
    }

    #[test]
    fn test_partial_last_batch() {
        let reader = numbers(5);
        let target = MemoryWriter::new().with_table("NUMS");
        let job = job_for(&reader, "nums");

        let engine = TransferEngine::new(&reader, &target, 2, CancellationToken::new());
        let stats = engine.execute(&job).unwrap();

        assert_eq!(stats.rows, 5);
        assert_eq!(stats.batches, 3);
        assert_eq!(target.batch_sizes("NUMS"), vec![2, 2, 1]);
        assert_eq!(target.rows("NUMS").len(), 5);
        assert_eq!(target.rows("NUMS")[4], vec![SqlValue::Integer(4)]);
    }

    #[test]
    fn test_exact_multiple_of_batch_size() {
        let reader = numbers(4);
        let target = MemoryWriter::new().with_table("NUMS");
        let job = job_for(&reader, "nums");

        let stats = TransferEngine::new(&reader, &target, 2, CancellationToken::new())
            .execute(&job)
            .unwrap();

        assert_eq!(stats.batches, 2);
        assert_eq!(target.batch_sizes("NUMS"), vec![2, 2]);
    }

    #[test]
    fn test_empty_table_submits_nothing() {
        let reader = numbers(0);
        let target = MemoryWriter::new().with_table("NUMS");
        let job = job_for(&reader, "nums");

        let stats = TransferEngine::new(&reader, &target, 1000, CancellationToken::new())
            .execute(&job)
            .unwrap();

        assert_eq!(stats.rows, 0);
        assert_eq!(stats.batches, 0);
        assert!(target.batch_sizes("NUMS").is_empty());
    }

    #[test]
    fn test_date_columns_are_parsed() {
        let reader = reader_with(
            "CREATE TABLE events (id INTEGER, happened DATE, note TEXT);
             INSERT INTO events VALUES (1, '2024-01-15', 'a');
             INSERT INTO events VALUES (2, '15/01/2024 08:30:00', '2024-01-15');
             INSERT INTO events VALUES (3, 'soon', NULL);
             INSERT INTO events VALUES (4, NULL, 'd');",
        );
        let target = MemoryWriter::new().with_table("EVENTS");
        let job = job_for(&reader, "events");

        TransferEngine::new(&reader, &target, 10, CancellationToken::new())
            .execute(&job)
            .unwrap();

        let rows = target.rows("EVENTS");
        let midnight = parse_date("2024-01-15").unwrap();
        assert_eq!(rows[0][1], SqlValue::DateTime(midnight));
        assert_eq!(
            rows[1][1],
            SqlValue::DateTime(parse_date("2024-01-15 08:30:00").unwrap())
        );
        // Text columns are never reinterpreted.
        assert_eq!(rows[1][2], SqlValue::Text("2024-01-15".to_string()));
        assert_eq!(rows[2][1], SqlValue::Text("soon".to_string()));
        assert_eq!(rows[2][2], SqlValue::Null);
        assert_eq!(rows[3][1], SqlValue::Null);
        assert_eq!(
            target.state().col_types.get("EVENTS").unwrap(),
            &vec![
                "NUMBER".to_string(),
                "DATE".to_string(),
                "VARCHAR2(4000)".to_string()
            ]
        );
    }

    #[test]
    fn test_text_wider_than_column_fails_table() {
        let reader = reader_with(
            "CREATE TABLE codes (code VARCHAR(5));
             INSERT INTO codes VALUES ('abcde');
             INSERT INTO codes VALUES ('ééé');",
        );
        let target = MemoryWriter::new().with_table("CODES");
        let job = job_for(&reader, "codes");

        let err = TransferEngine::new(&reader, &target, 10, CancellationToken::new())
            .execute(&job)
            .unwrap_err();

        // Width is counted in bytes: three two-byte characters exceed five.
        match err {
            MigrateError::Transfer { table, message } => {
                assert_eq!(table, "CODES");
                assert!(message.contains("row 2"), "{}", message);
                assert!(message.contains("column CODE"), "{}", message);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(target.batch_sizes("CODES").is_empty());
    }

    #[test]
    fn test_write_failure_propagates() {
        let reader = numbers(3);
        let target = MemoryWriter::new()
            .with_table("NUMS")
            .failing_writes_to("NUMS");
        let job = job_for(&reader, "nums");

        let result = TransferEngine::new(&reader, &target, 2, CancellationToken::new()).execute(&job);
        assert!(matches!(result, Err(MigrateError::Transfer { .. })));
    }

    #[test]
    fn test_cancelled_before_first_row() {
        let reader = numbers(3);
        let target = MemoryWriter::new().with_table("NUMS");
        let job = job_for(&reader, "nums");

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = TransferEngine::new(&reader, &target, 2, cancel).execute(&job);
        assert!(matches!(result, Err(MigrateError::Cancelled)));
        assert!(target.batch_sizes("NUMS").is_empty());
    }

    #[test]
    fn test_progress_reported_per_batch() {
        let reader = numbers(3);
        let target = MemoryWriter::new().with_table("NUMS");
        let job = job_for(&reader, "nums");

        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = updates.clone();
        let engine = TransferEngine::new(&reader, &target, 2, CancellationToken::new())
            .with_progress(Arc::new(move |u: &ProgressUpdate| {
                sink.lock().unwrap().push(u.clone());
            }));
        engine.execute(&job).unwrap();

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].rows_copied, 2);
        assert_eq!(updates[0].rows_total, 3);
        assert_eq!(updates[1].rows_copied, 3);
        assert_eq!(updates[1].batches, 2);
        assert_eq!(updates[1].percent, 100.0);
    }
}
