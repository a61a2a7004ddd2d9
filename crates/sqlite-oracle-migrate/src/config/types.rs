//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration (SQLite).
    pub sqlite: SqliteConfig,

    /// Target database configuration (Oracle).
    pub oracle: OracleConfig,

    /// Migration behavior configuration.
    pub migration: MigrationConfig,
}

/// Raw file layout. Every section is optional here so that a missing
/// section can be reported by name instead of as a serde field error.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigFile {
    #[serde(default, alias = "SQLITE")]
    pub sqlite: Option<SqliteConfig>,

    #[serde(default, alias = "ORACLE")]
    pub oracle: Option<OracleConfig>,

    #[serde(default, alias = "MIGRATION")]
    pub migration: Option<MigrationConfig>,
}

/// Source database (SQLite) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file.
    #[serde(default)]
    pub database: String,
}

/// Target database (Oracle) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Listener host.
    #[serde(default)]
    pub host: String,

    /// Listener port (default: 1521).
    #[serde(default = "default_oracle_port")]
    pub port: u16,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Service name (preferred when both are set).
    #[serde(default)]
    pub service_name: Option<String>,

    /// System identifier, used alone or as a fallback for the service name.
    #[serde(default)]
    pub sid: Option<String>,
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("service_name", &self.service_name)
            .field("sid", &self.sid)
            .finish()
    }
}

impl OracleConfig {
    /// Service name, treating a blank value as unset.
    pub fn service_name(&self) -> Option<&str> {
        non_blank(self.service_name.as_deref())
    }

    /// SID, treating a blank value as unset.
    pub fn sid(&self) -> Option<&str> {
        non_blank(self.sid.as_deref())
    }

    /// Connection targets in the order they should be attempted.
    ///
    /// The service name comes first; a configured SID follows as fallback.
    pub fn connect_targets(&self) -> Vec<ConnectTarget> {
        let mut targets = Vec::with_capacity(2);
        if let Some(service) = self.service_name() {
            targets.push(ConnectTarget::ServiceName(service.to_string()));
        }
        if let Some(sid) = self.sid() {
            targets.push(ConnectTarget::Sid(sid.to_string()));
        }
        targets
    }
}

/// One way of addressing an Oracle database on a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    ServiceName(String),
    Sid(String),
}

impl ConnectTarget {
    /// Build the connect string understood by the Oracle client.
    pub fn connect_string(&self, host: &str, port: u16) -> String {
        match self {
            ConnectTarget::ServiceName(service) => format!("//{}:{}/{}", host, port, service),
            ConnectTarget::Sid(sid) => format!(
                "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST={})(PORT={}))(CONNECT_DATA=(SID={})))",
                host, port, sid
            ),
        }
    }

    /// Human-readable label for logs.
    pub fn describe(&self) -> String {
        match self {
            ConnectTarget::ServiceName(service) => format!("service name {}", service),
            ConnectTarget::Sid(sid) => format!("SID {}", sid),
        }
    }
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Target mode (default: append).
    #[serde(default)]
    pub mode: MigrationMode,

    /// Rows per bulk insert (default: 1000).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Replace spaces with underscores and upper-case names (default: true).
    #[serde(default = "default_true")]
    pub normalize_names: bool,

    /// Log mapped types, generated DDL and full error chains (default: false).
    #[serde(default)]
    pub debug_mode: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            mode: MigrationMode::default(),
            batch_size: default_batch_size(),
            normalize_names: true,
            debug_mode: false,
        }
    }
}

/// How existing destination tables are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationMode {
    /// Keep existing tables and insert into them; create missing ones.
    #[default]
    #[serde(alias = "APPEND", alias = "Append")]
    Append,

    /// Drop and recreate every destination table.
    #[serde(alias = "TRUNCATE", alias = "Truncate")]
    Truncate,
}

impl fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationMode::Append => write!(f, "append"),
            MigrationMode::Truncate => write!(f, "truncate"),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// Default value functions for serde
fn default_oracle_port() -> u16 {
    1521
}

fn default_batch_size() -> usize {
    1000
}

fn default_true() -> bool {
    true
}
