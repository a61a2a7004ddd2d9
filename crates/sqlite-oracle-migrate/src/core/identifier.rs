//! Identifier validation and quoting.
//!
//! Table and column names cannot be bound as parameters, so every name that
//! ends up in generated SQL goes through this module. Names are validated
//! (non-empty, no NUL byte, bounded length) and then wrapped in double
//! quotes with embedded quotes doubled. Both SQLite and Oracle use the same
//! quoting rule; Oracle additionally treats a quoted name case-sensitively,
//! which is why normalization (see [`crate::schema::normalize_name`]) happens
//! before quoting.

use crate::error::{MigrateError, Result};

/// Maximum identifier length.
/// - Oracle 12.2+: 128 bytes
/// - SQLite: unbounded, capped here for sanity
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// Rejects empty identifiers, identifiers containing null bytes and
/// identifiers exceeding the maximum length.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote an Oracle identifier.
pub fn quote_oracle(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(quote(name))
}

/// Quote a SQLite identifier.
///
/// SQLite names come from `sqlite_master`, so only the NUL check applies;
/// length is not limited.
pub fn quote_sqlite(name: &str) -> Result<String> {
    if name.contains('\0') {
        return Err(MigrateError::SchemaExtraction(format!(
            "table or column name contains null byte: {:?}",
            name
        )));
    }
    Ok(quote(name))
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
