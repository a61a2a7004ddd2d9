//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (missing section, invalid value, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file could not be read or parsed
    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] ::config::ConfigError),

    /// Source database (SQLite) query error
    #[error("Source database error: {0}")]
    Source(#[from] rusqlite::Error),

    /// Target database (Oracle) query error
    #[error("Target database error: {0}")]
    Target(#[from] oracle::Error),

    /// Could not connect to a database
    #[error("Connection to {target} failed: {message}")]
    Connection { target: String, message: String },

    /// Schema extraction failed
    #[error("Schema extraction failed: {0}")]
    SchemaExtraction(String),

    /// Destination table could not be prepared
    #[error("Schema creation failed for table {table}: {message}")]
    Schema { table: String, message: String },

    /// Data transfer failed for a specific table
    #[error("Transfer failed for table {table}: {message}")]
    Transfer { table: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Migration was cancelled (SIGINT, etc.)
    #[error("Migration cancelled")]
    Cancelled,
}

impl MigrateError {
    /// Create a Connection error.
    pub fn connection(target: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Connection {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a Schema error.
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Schema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a Transfer error
    pub fn transfer(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Transfer {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
