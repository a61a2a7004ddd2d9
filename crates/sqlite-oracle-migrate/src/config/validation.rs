//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.sqlite.database.trim().is_empty() {
        return Err(MigrateError::Config("SQLITE.database is required".into()));
    }

    // Target validation
    if config.oracle.host.trim().is_empty() {
        return Err(MigrateError::Config("ORACLE.host is required".into()));
    }
    if config.oracle.user.trim().is_empty() {
        return Err(MigrateError::Config("ORACLE.user is required".into()));
    }
    if config.oracle.port == 0 {
        return Err(MigrateError::Config("ORACLE.port must be non-zero".into()));
    }
    if config.oracle.service_name().is_none() && config.oracle.sid().is_none() {
        return Err(MigrateError::Config(
            "ORACLE section needs either service_name or sid".into(),
        ));
    }

    // Migration config validation
    if config.migration.batch_size == 0 {
        return Err(MigrateError::Config(
            "MIGRATION.batch_size must be at least 1".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MigrationConfig, OracleConfig, SqliteConfig};

    fn valid_config() -> Config {
        Config {
            sqlite: SqliteConfig {
                database: "data.db".to_string(),
            },
            oracle: OracleConfig {
                host: "localhost".to_string(),
                port: 1521,
                user: "system".to_string(),
                password: "oracle".to_string(),
                service_name: Some("XEPDB1".to_string()),
                sid: None,
            },
            migration: MigrationConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_database() {
        let mut config = valid_config();
        config.sqlite.database = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_host() {
        let mut config = valid_config();
        config.oracle.host = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_requires_service_name_or_sid() {
        let mut config = valid_config();
        config.oracle.service_name = None;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("service_name or sid"));

        config.oracle.sid = Some("XE".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_blank_service_name_counts_as_unset() {
        let mut config = valid_config();
        config.oracle.service_name = Some("   ".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = valid_config();
        config.migration.batch_size = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_oracle_config_debug_redacts_password() {
        let mut config = valid_config();
        config.oracle.password = "super_secret_password_456".to_string();
        let debug_output = format!("{:?}", config.oracle);
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_password_456"),
            "Debug output should not contain actual password value"
        );
    }
}
