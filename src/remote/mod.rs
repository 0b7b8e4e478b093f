//! Row-oriented access to the remote authoritative store.
//!
//! The rest of the engine never issues queries; it only sees the
//! [`RemoteStore`] interface (insert, update, delete, select) over five
//! collections. [`rows`] is the sole translation boundary between the
//! in-memory camelCase models and the remote snake_case rows, and
//! [`RemoteAdapter`] maps each queued action onto remote operations.

mod adapter;
mod memory;
mod rest;
pub mod rows;

use serde_json::Value;
use std::future::Future;
use thiserror::Error;

pub use adapter::RemoteAdapter;
pub use memory::MemoryRemote;
pub use rest::RestRemote;

/// The remote row collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Exercises,
    Workouts,
    WorkoutEntries,
    BodyWeightHistory,
    AppState,
}

impl Table {
    /// Remote collection name.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Exercises => "exercises",
            Table::Workouts => "workouts",
            Table::WorkoutEntries => "workout_entries",
            Table::BodyWeightHistory => "body_weight_history",
            Table::AppState => "app_state",
        }
    }
}

/// Errors from remote store operations.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned status {status} for {table}")]
    Status { table: &'static str, status: u16 },

    #[error("Invalid row in {0}: {1}")]
    Decode(&'static str, String),

    #[error("Remote store unavailable")]
    Unavailable,
}

/// Row-oriented read/write interface to the remote store.
///
/// Rows are JSON objects in the remote field convention. Implementations
/// must preserve insertion order in `select_all` for a given backend; any
/// ordering the engine relies on is applied client-side.
pub trait RemoteStore: Send + Sync + 'static {
    fn select_all(
        &self,
        table: Table,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteError>> + Send;

    fn select_by_id(
        &self,
        table: Table,
        id: &str,
    ) -> impl Future<Output = Result<Option<Value>, RemoteError>> + Send;

    fn insert(
        &self,
        table: Table,
        rows: Vec<Value>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn upsert(
        &self,
        table: Table,
        row: Value,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn update(
        &self,
        table: Table,
        id: &str,
        changes: Value,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete(
        &self,
        table: Table,
        id: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete_all(&self, table: Table) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Exercises.name(), "exercises");
        assert_eq!(Table::WorkoutEntries.name(), "workout_entries");
        assert_eq!(Table::BodyWeightHistory.name(), "body_weight_history");
        assert_eq!(Table::AppState.name(), "app_state");
    }
}
