//! Configuration loading and validation.
//!
//! The configuration is an INI file with three required sections:
//!
//! ```ini
//! [SQLITE]
//! database = data.db
//!
//! [ORACLE]
//! user = system
//! password = oracle
//! host = localhost
//! port = 1521
//! service_name = XEPDB1
//!
//! [MIGRATION]
//! mode = truncate
//! batch_size = 1000
//! normalize_names = true
//! debug_mode = false
//! ```

mod template;
mod types;
mod validation;

pub use template::SAMPLE_CONFIG;
pub use types::*;

use crate::error::{MigrateError, Result};
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "migration.cfg";

impl Config {
    /// Load configuration from an INI file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MigrateError::Config(format!(
                "configuration file '{}' not found",
                path.display()
            )));
        }
        let ini = std::fs::read_to_string(path)?;
        Self::from_ini(&ini)
    }

    /// Parse configuration from an INI string.
    ///
    /// Values are taken literally: backslashes (Windows paths, passwords)
    /// and quotes are kept as written.
    pub fn from_ini(ini: &str) -> Result<Self> {
        let literal = escape_literal(ini);
        let raw: ConfigFile = ::config::Config::builder()
            .add_source(::config::File::from_str(&literal, ::config::FileFormat::Ini))
            .build()?
            .try_deserialize()?;

        let config = Config {
            sqlite: raw.sqlite.ok_or_else(|| missing_section("SQLITE"))?,
            oracle: raw.oracle.ok_or_else(|| missing_section("ORACLE"))?,
            migration: raw.migration.ok_or_else(|| missing_section("MIGRATION"))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Log the effective settings (password excluded).
    pub fn log_summary(&self) {
        info!("SQLite database: {}", self.sqlite.database);
        info!(
            "Oracle: {}@{}:{}",
            self.oracle.user, self.oracle.host, self.oracle.port
        );
        if let Some(service) = self.oracle.service_name() {
            info!("Oracle service name: {}", service);
        }
        if let Some(sid) = self.oracle.sid() {
            info!("Oracle SID: {}", sid);
        }
        if self.oracle.service_name().is_some() && self.oracle.sid().is_some() {
            warn!("Both service_name and sid are set; sid is only used if the service name fails");
        }
        info!(
            "Mode: {}, batch size: {}, normalize names: {}, debug: {}",
            self.migration.mode,
            self.migration.batch_size,
            self.migration.normalize_names,
            self.migration.debug_mode
        );
    }
}

/// The INI reader behind `config` unescapes backslash sequences and strips
/// quotes around values. Escaping those characters first makes it hand
/// every value back verbatim.
fn escape_literal(ini: &str) -> String {
    let mut escaped = String::with_capacity(ini.len());
    for ch in ini.chars() {
        if matches!(ch, '\\' | '"' | '\'') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn missing_section(name: &str) -> MigrateError {
    MigrateError::Config(format!(
        "section [{}] not found in configuration file",
        name
    ))
}
