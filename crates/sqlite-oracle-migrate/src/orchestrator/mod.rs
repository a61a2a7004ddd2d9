//! Migration orchestrator - main workflow coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::core::traits::{SourceReader, TargetWriter};
use crate::error::{MigrateError, Result};
use crate::schema::{materialize, Materialization, TablePlan};
use crate::source::SqliteReader;
use crate::target::OracleWriter;
use crate::transfer::{ProgressCallback, TransferEngine, TransferJob};
use crate::typemap::SqliteToOracleMapper;

/// Migration orchestrator.
pub struct Orchestrator {
    config: Config,
    source: Box<dyn SourceReader>,
    target: Box<dyn TargetWriter>,
    mapper: SqliteToOracleMapper,
    progress: Option<ProgressCallback>,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status: "completed" or "failed".
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total tables processed.
    pub tables_total: usize,

    /// Tables successfully migrated.
    pub tables_success: usize,

    /// Tables that failed.
    pub tables_failed: usize,

    /// Total rows transferred.
    pub rows_transferred: u64,

    /// Average throughput (rows/second).
    pub rows_per_second: u64,

    /// List of failed table names.
    pub failed_tables: Vec<String>,

    /// Per-table outcome, in source order.
    pub tables: Vec<TableResult>,
}

/// Outcome for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableResult {
    pub source_table: String,
    pub target_table: String,
    pub materialization: Materialization,
    pub rows: u64,
    pub batches: u64,
    pub duration_seconds: f64,
    /// Error message when the copy failed.
    pub error: Option<String>,
}

impl TableResult {
    /// Check if the table copied without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl MigrationResult {
    /// Check if every table was migrated.
    pub fn is_success(&self) -> bool {
        self.tables_failed == 0
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Orchestrator {
    /// Open the SQLite source and connect to Oracle.
    pub fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let source = SqliteReader::open(&config.sqlite.database)?;
        let target = OracleWriter::connect(&config.oracle)?;
        Ok(Self::new(config, Box::new(source), Box::new(target)))
    }

    /// Create an orchestrator over already open endpoints.
    pub fn new(
        config: Config,
        source: Box<dyn SourceReader>,
        target: Box<dyn TargetWriter>,
    ) -> Self {
        Self {
            config,
            source,
            target,
            mapper: SqliteToOracleMapper::new(),
            progress: None,
        }
    }

    /// Report progress after every committed batch.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run the migration.
    ///
    /// Schema extraction and table creation failures abort the run. A table
    /// whose copy fails is recorded in the result and the run moves on to
    /// the next table.
    pub fn run(self, cancel: &CancellationToken) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        info!("Starting migration run: {}", run_id);
        self.config.log_summary();

        // Phase 1: Extract schema
        info!(
            "Phase 1: Extracting schema from source ({})",
            self.source.db_type()
        );
        let tables = self.source.extract_schema()?;
        if tables.is_empty() {
            return Err(MigrateError::SchemaExtraction(
                "no user tables found in source database".to_string(),
            ));
        }

        info!("Found {} tables to migrate", tables.len());
        for table in &tables {
            info!(
                "  {}: {} columns, {} rows",
                table.name,
                table.columns.len(),
                table.row_count
            );
        }

        check_cancelled(cancel)?;

        // Phase 2: Prepare target
        let mode = self.config.migration.mode;
        info!(
            "Phase 2: Preparing target tables ({}, mode: {})",
            self.target.db_type(),
            mode
        );
        let normalize = self.config.migration.normalize_names;
        let mut jobs = Vec::with_capacity(tables.len());
        for table in tables {
            check_cancelled(cancel)?;
            let plan = TablePlan::from_table(&table, normalize, &self.mapper);
            let outcome = materialize(self.target.as_ref(), &plan, mode)?;
            jobs.push((TransferJob { table, plan }, outcome));
        }

        // Phase 3: Transfer data
        info!("Phase 3: Transferring data");
        let mut engine = TransferEngine::new(
            self.source.as_ref(),
            self.target.as_ref(),
            self.config.migration.batch_size,
            cancel.clone(),
        );
        if let Some(progress) = &self.progress {
            engine = engine.with_progress(progress.clone());
        }

        let mut results = Vec::with_capacity(jobs.len());
        for (job, materialization) in &jobs {
            check_cancelled(cancel)?;
            let table_start = std::time::Instant::now();
            let (rows, batches, error) = match engine.execute(job) {
                Ok(stats) => (stats.rows, stats.batches, None),
                Err(MigrateError::Cancelled) => {
                    warn!("Cancelled while copying {}", job.plan.target_name);
                    return Err(MigrateError::Cancelled);
                }
                Err(e) => {
                    error!("{}: {}", job.plan.target_name, e);
                    (0, 0, Some(e.to_string()))
                }
            };

            results.push(TableResult {
                source_table: job.plan.source_name.clone(),
                target_table: job.plan.target_name.clone(),
                materialization: *materialization,
                rows,
                batches,
                duration_seconds: table_start.elapsed().as_secs_f64(),
                error,
            });
        }

        // A signal during the last flush or an empty table still fails the run.
        check_cancelled(cancel)?;

        // Build result
        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let failed_tables: Vec<String> = results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.target_table.clone())
            .collect();
        let rows_transferred: u64 = results.iter().map(|r| r.rows).sum();

        let rows_per_second = if duration > 0.0 {
            (rows_transferred as f64 / duration) as u64
        } else {
            0
        };

        let status = if failed_tables.is_empty() {
            "completed"
        } else {
            "failed"
        };

        let result = MigrationResult {
            run_id,
            status: status.to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            tables_total: results.len(),
            tables_success: results.len() - failed_tables.len(),
            tables_failed: failed_tables.len(),
            rows_transferred,
            rows_per_second,
            failed_tables,
            tables: results,
        };

        info!(
            "Migration {}: {}/{} tables, {} rows in {:.1}s ({} rows/s)",
            result.status,
            result.tables_success,
            result.tables_total,
            result.rows_transferred,
            result.duration_seconds,
            result.rows_per_second
        );
        if !result.is_success() {
            warn!("Failed tables: {}", result.failed_tables.join(", "));
        }

        Ok(result)
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        warn!("Migration cancelled");
        return Err(MigrateError::Cancelled);
    }
    Ok(())
}
