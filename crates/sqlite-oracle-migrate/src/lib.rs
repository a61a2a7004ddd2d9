//! # sqlite-oracle-migrate
//!
//! One-shot migration of a SQLite database into an Oracle schema.
//!
//! Every user table in the SQLite file becomes an Oracle table:
//!
//! - **Type mapping** from SQLite declared types to Oracle column types,
//!   refined with the stored `CREATE TABLE` text
//! - **Append or truncate** handling of existing destination tables
//! - **Batched bulk inserts** with one commit per batch
//! - **Date parsing** of text cells headed for DATE and TIMESTAMP columns
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlite_oracle_migrate::{Config, Orchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! fn main() -> sqlite_oracle_migrate::Result<()> {
//!     let config = Config::load("migration.cfg")?;
//!     let orchestrator = Orchestrator::connect(config)?;
//!     let result = orchestrator.run(&CancellationToken::new())?;
//!     println!("Migrated {} rows", result.rows_transferred);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod schema;
pub mod source;
pub mod target;
pub mod transfer;
pub mod typemap;

// Re-exports for convenient access
pub use self::config::{Config, MigrationConfig, MigrationMode, OracleConfig, SqliteConfig};
pub use self::core::{Column, SourceReader, SqlValue, Table, TargetWriter, TypeMapper, TypeMapping};
pub use error::{MigrateError, Result};
pub use orchestrator::{MigrationResult, Orchestrator, TableResult};
pub use schema::{Materialization, TablePlan};
pub use source::SqliteReader;
pub use target::OracleWriter;
pub use transfer::{ProgressCallback, ProgressUpdate, TransferEngine, TransferJob, TransferStats};
pub use typemap::SqliteToOracleMapper;
