//! In-memory target used by pipeline tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::core::traits::TargetWriter;
use crate::core::value::SqlValue;
use crate::error::{MigrateError, Result};

#[derive(Debug, Default)]
pub(crate) struct Recorded {
    pub tables: HashMap<String, Vec<Vec<SqlValue>>>,
    pub ddl: Vec<String>,
    pub dropped: Vec<String>,
    /// (table, rows) per committed batch.
    pub batches: Vec<(String, usize)>,
    pub col_types: HashMap<String, Vec<String>>,
    pub fail_writes_to: Option<String>,
    pub fail_creates: bool,
    /// Cancelled once a table has been created.
    pub cancel_on_create: Option<CancellationToken>,
    /// Cancelled once a batch has been written.
    pub cancel_on_write: Option<CancellationToken>,
}

/// Shares its state with clones so tests can inspect it after the writer
/// has been moved into the pipeline.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryWriter {
    state: Arc<Mutex<Recorded>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(name.to_string(), Vec::new());
        self
    }

    pub fn failing_writes_to(self, name: &str) -> Self {
        self.state.lock().unwrap().fail_writes_to = Some(name.to_string());
        self
    }

    pub fn failing_creates(self) -> Self {
        self.state.lock().unwrap().fail_creates = true;
        self
    }

    pub fn cancelling_on_create(self, cancel: &CancellationToken) -> Self {
        self.state.lock().unwrap().cancel_on_create = Some(cancel.clone());
        self
    }

    pub fn cancelling_on_write(self, cancel: &CancellationToken) -> Self {
        self.state.lock().unwrap().cancel_on_write = Some(cancel.clone());
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.lock().unwrap()
    }

    pub fn rows(&self, table: &str) -> Vec<Vec<SqlValue>> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn batch_sizes(&self, table: &str) -> Vec<usize> {
        self.state()
            .batches
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, n)| *n)
            .collect()
    }
}

fn created_table_name(ddl: &str) -> Option<String> {
    let rest = ddl.strip_prefix("CREATE TABLE \"")?;
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

impl TargetWriter for MemoryWriter {
    fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.state().tables.contains_key(table))
    }

    fn drop_table(&self, table: &str) -> Result<()> {
        let mut state = self.state();
        if state.tables.remove(table).is_some() {
            state.dropped.push(table.to_string());
        }
        Ok(())
    }

    fn create_table(&self, ddl: &str) -> Result<()> {
        let mut state = self.state();
        let name = created_table_name(ddl).unwrap_or_default();
        if state.fail_creates {
            return Err(MigrateError::schema(name, "ORA-00955: name is already used"));
        }
        state.ddl.push(ddl.to_string());
        state.tables.insert(name, Vec::new());
        if let Some(cancel) = &state.cancel_on_create {
            cancel.cancel();
        }
        Ok(())
    }

    fn write_batch(
        &self,
        table: &str,
        _cols: &[String],
        col_types: &[String],
        batch: &[Vec<SqlValue>],
    ) -> Result<u64> {
        let mut state = self.state();
        if state.fail_writes_to.as_deref() == Some(table) {
            return Err(MigrateError::transfer(table, "ORA-01722: invalid number"));
        }
        let rows = state
            .tables
            .get_mut(table)
            .ok_or_else(|| MigrateError::transfer(table, "table does not exist"))?;
        rows.extend(batch.iter().cloned());
        state.batches.push((table.to_string(), batch.len()));
        state
            .col_types
            .insert(table.to_string(), col_types.to_vec());
        if let Some(cancel) = &state.cancel_on_write {
            cancel.cancel();
        }
        Ok(batch.len() as u64)
    }

    fn db_type(&self) -> &str {
        "memory"
    }
}
