//! In-memory [`RemoteStore`] for tests and local development.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{RemoteError, RemoteStore, Table};

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<Table, Vec<Value>>,
    failing: bool,
}

/// A remote store backed by per-table `Vec`s behind a mutex.
///
/// Preserves insertion order and supports a fail switch that makes every
/// operation error, to simulate an outage while the connectivity oracle
/// still reports reachable.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every operation fails with [`RemoteError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Current rows of a table, for test assertions.
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().tables.get(&table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.lock().failing {
            Err(RemoteError::Unavailable)
        } else {
            Ok(())
        }
    }
}

/// Stringified `id` field of a row, covering both UUID and integer ids.
fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Shallow-merges `changes` into `row`; both must be objects.
fn merge(row: &mut Value, changes: &Value) {
    if let (Value::Object(row), Value::Object(changes)) = (row, changes) {
        for (key, value) in changes {
            row.insert(key.clone(), value.clone());
        }
    }
}

impl RemoteStore for MemoryRemote {
    async fn select_all(&self, table: Table) -> Result<Vec<Value>, RemoteError> {
        self.check()?;
        Ok(self.rows(table))
    }

    async fn select_by_id(&self, table: Table, id: &str) -> Result<Option<Value>, RemoteError> {
        self.check()?;
        Ok(self
            .lock()
            .tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|r| row_id(r).as_deref() == Some(id)))
            .cloned())
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<(), RemoteError> {
        self.check()?;
        self.lock().tables.entry(table).or_default().extend(rows);
        Ok(())
    }

    async fn upsert(&self, table: Table, row: Value) -> Result<(), RemoteError> {
        self.check()?;
        let mut inner = self.lock();
        let rows = inner.tables.entry(table).or_default();
        let id = row_id(&row);
        match rows
            .iter_mut()
            .find(|r| id.is_some() && row_id(r) == id)
        {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, changes: Value) -> Result<(), RemoteError> {
        self.check()?;
        let mut inner = self.lock();
        if let Some(rows) = inner.tables.get_mut(&table) {
            for row in rows.iter_mut() {
                if row_id(row).as_deref() == Some(id) {
                    merge(row, &changes);
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), RemoteError> {
        self.check()?;
        let mut inner = self.lock();
        if let Some(rows) = inner.tables.get_mut(&table) {
            rows.retain(|r| row_id(r).as_deref() != Some(id));
        }
        Ok(())
    }

    async fn delete_all(&self, table: Table) -> Result<(), RemoteError> {
        self.check()?;
        self.lock().tables.remove(&table);
        Ok(())
    }
}
