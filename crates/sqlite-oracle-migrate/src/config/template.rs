//! Template written by `--create-config`.

/// Commented sample configuration.
pub const SAMPLE_CONFIG: &str = r#"[SQLITE]
# Path to the SQLite database file
database = data.db

[ORACLE]
# Oracle connection settings
user = system
password = oracle
host = localhost
port = 1521

# Set service_name OR sid.
#
# Service name (preferred): Oracle Cloud, RAC, pluggable databases.
# Examples: XEPDB1, orcl, myservice.example.com
service_name = XEPDB1

# SID (traditional): older Oracle XE, standalone installs.
# Examples: XE, ORCL
# If both are set, the SID is tried when the service name fails.
# sid = XE

# To find out which one to use:
# 1. SQL*Plus: SELECT value FROM v$parameter WHERE name = 'service_names';
# 2. Listener: lsnrctl status
# 3. tnsnames.ora: look for SERVICE_NAME or SID

[MIGRATION]
# append: keep existing tables and insert into them
# truncate: drop and recreate every destination table
mode = truncate

# Replace spaces with underscores and upper-case table/column names
normalize_names = true

# Rows per bulk insert
batch_size = 1000

# Log type mappings, generated SQL and full error chains
debug_mode = false
"#;
