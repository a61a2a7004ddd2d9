//! Destination table planning and creation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::MigrationMode;
use crate::core::identifier::quote_oracle;
use crate::core::schema::Table;
use crate::core::traits::{TargetWriter, TypeMapper};
use crate::error::{MigrateError, Result};

/// Normalize a name for Oracle: spaces become underscores, then upper case.
///
/// Identity when `enabled` is false.
pub fn normalize_name(name: &str, enabled: bool) -> String {
    if enabled {
        name.replace(' ', "_").to_uppercase()
    } else {
        name.to_string()
    }
}

/// Destination view of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    pub source_name: String,
    pub target_name: String,
    pub source_type: String,
    pub target_type: String,
    /// Mapping warning for lossy conversions.
    pub warning: Option<String>,
}

/// Destination view of one table.
#[derive(Debug, Clone)]
pub struct TablePlan {
    pub source_name: String,
    pub target_name: String,
    pub columns: Vec<ColumnPlan>,
}

impl TablePlan {
    /// Plan the destination table for a source table.
    pub fn from_table(table: &Table, normalize: bool, mapper: &dyn TypeMapper) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|col| {
                let mapping = mapper.map_column(col);
                ColumnPlan {
                    source_name: col.name.clone(),
                    target_name: normalize_name(&col.name, normalize),
                    source_type: col.data_type.clone(),
                    target_type: mapping.target_type,
                    warning: mapping.warning,
                }
            })
            .collect();

        Self {
            source_name: table.name.clone(),
            target_name: normalize_name(&table.name, normalize),
            columns,
        }
    }

    /// Target column names in source column order.
    pub fn target_columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.target_name.clone()).collect()
    }

    /// Target column types in source column order.
    pub fn target_types(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.target_type.clone()).collect()
    }

    /// Render the `CREATE TABLE` statement.
    pub fn create_table_sql(&self) -> Result<String> {
        let cols = self
            .columns
            .iter()
            .map(|c| Ok(format!("{} {}", quote_oracle(&c.target_name)?, c.target_type)))
            .collect::<Result<Vec<_>>>()?;

        Ok(format!(
            "CREATE TABLE {} ({})",
            quote_oracle(&self.target_name)?,
            cols.join(", ")
        ))
    }
}

/// What [`materialize`] did to the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Materialization {
    Created,
    Recreated,
    Reused,
}

/// Make sure the destination table exists according to `mode`.
///
/// Truncate drops and recreates; append reuses an existing table as is,
/// without checking that its columns match.
pub fn materialize(
    target: &dyn TargetWriter,
    plan: &TablePlan,
    mode: MigrationMode,
) -> Result<Materialization> {
    let name = &plan.target_name;
    let schema_err = |e: MigrateError| match e {
        MigrateError::Schema { .. } => e,
        other => MigrateError::schema(name.as_str(), other.to_string()),
    };

    for col in &plan.columns {
        debug!(
            "{}.{}: {} -> {}",
            plan.source_name,
            col.source_name,
            if col.source_type.is_empty() { "<none>" } else { col.source_type.as_str() },
            col.target_type
        );
        if let Some(warning) = &col.warning {
            debug!("{}.{}: {}", plan.source_name, col.source_name, warning);
        }
    }

    let ddl = plan.create_table_sql().map_err(schema_err)?;
    let exists = target.table_exists(name).map_err(schema_err)?;

    let outcome = match (mode, exists) {
        (MigrationMode::Append, true) => {
            info!("Table {} exists, appending", name);
            return Ok(Materialization::Reused);
        }
        (MigrationMode::Truncate, true) => {
            warn!("Dropping existing table {}", name);
            target.drop_table(name).map_err(schema_err)?;
            Materialization::Recreated
        }
        (_, false) => Materialization::Created,
    };

    debug!("DDL: {}", ddl);
    target.create_table(&ddl).map_err(schema_err)?;
    info!("Created table {}", name);

    Ok(outcome)
}
