use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::Snapshot;
use crate::remote::{RemoteAdapter, RemoteError, RemoteStore};
use crate::store::{ActionPayload, LocalStore, PendingLog};

use super::connectivity::Connectivity;

/// Where the engine stands relative to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Remote unreachable; all work is local.
    Offline,
    /// Reachable with an empty pending log.
    OnlineSynced,
    /// Reachable but queued mutations remain.
    OnlinePendingSync,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Offline => write!(f, "offline"),
            SyncState::OnlineSynced => write!(f, "synced"),
            SyncState::OnlinePendingSync => write!(f, "pending sync"),
        }
    }
}

/// Orchestrates apply-locally-first mutations against the opportunistic
/// remote reconciliation.
///
/// One engine instance owns the local store and pending log for the whole
/// session; overlapping drains are serialized through a single mutex so two
/// replays can never interleave their remote writes.
pub struct SyncEngine<R, C> {
    local: LocalStore,
    pending: PendingLog,
    remote: RemoteAdapter<R>,
    connectivity: C,
    drain_lock: Mutex<()>,
}

impl<R: RemoteStore, C: Connectivity> SyncEngine<R, C> {
    pub fn new(local: LocalStore, pending: PendingLog, remote: R, connectivity: C) -> Self {
        Self {
            local,
            pending,
            remote: RemoteAdapter::new(remote),
            connectivity,
            drain_lock: Mutex::new(()),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.connectivity.is_reachable()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn state(&self) -> SyncState {
        if !self.is_reachable() {
            SyncState::Offline
        } else if self.pending.is_empty() {
            SyncState::OnlineSynced
        } else {
            SyncState::OnlinePendingSync
        }
    }

    pub fn read_local(&self) -> Snapshot {
        self.local.read_snapshot()
    }

    pub fn write_local(&self, snapshot: &Snapshot) {
        self.local.write_snapshot(snapshot);
    }

    pub fn clear_pending(&self) {
        self.pending.clear();
    }

    /// Loads the working snapshot.
    ///
    /// Reachable: drain first, then pull the remote snapshot and overwrite
    /// the local copy (local acts purely as a cache). Any remote failure,
    /// or being offline, falls back to the local snapshot unchanged.
    pub async fn load(&self) -> Snapshot {
        if self.is_reachable() {
            let _guard = self.drain_lock.lock().await;
            self.drain_locked().await;
            match self.pull_remote().await {
                Ok(snapshot) => {
                    self.local.write_snapshot(&snapshot);
                    return snapshot;
                }
                Err(e) => {
                    tracing::warn!("Remote load failed, falling back to local snapshot: {}", e);
                }
            }
        }
        self.local.read_snapshot()
    }

    /// Explicit drain-and-reload, identical to the became-reachable cycle.
    pub async fn sync_now(&self) -> Snapshot {
        self.load().await
    }

    /// Replays every queued action, then drops the attempted prefix from
    /// the queue; actions enqueued while the drain is in flight stay queued
    /// for the next pass. Returns the number of actions attempted.
    pub async fn drain(&self) -> usize {
        let _guard = self.drain_lock.lock().await;
        self.drain_locked().await
    }

    async fn drain_locked(&self) -> usize {
        if !self.is_reachable() {
            return 0;
        }
        let actions = self.pending.all();
        if actions.is_empty() {
            return 0;
        }

        tracing::debug!("Draining {} pending action(s)", actions.len());
        for action in &actions {
            if let Err(e) = self.remote.apply(action).await {
                // Best-effort per action: a failed action is logged, skipped
                // and, because the attempted prefix drops below, forgotten.
                tracing::warn!(
                    kind = action.payload.kind(),
                    action_id = %action.id,
                    "Failed to apply pending action, continuing: {}",
                    e
                );
            }
        }
        self.pending.remove_first(actions.len());
        tracing::debug!("Drain complete");
        actions.len()
    }

    async fn pull_remote(&self) -> Result<Snapshot, RemoteError> {
        self.remote.seed_if_empty().await?;
        self.remote.fetch_snapshot().await
    }

    /// Out-of-band remote reset: wipe the four tables, clear the pointers,
    /// reseed and return the fresh remote snapshot.
    pub async fn reset_remote(&self) -> Result<Snapshot, RemoteError> {
        let _guard = self.drain_lock.lock().await;
        self.remote.wipe_and_reseed().await?;
        self.remote.fetch_snapshot().await
    }

    /// Persists a mutated snapshot and, when a payload is given, queues it
    /// and kicks off a fire-and-forget drain.
    pub fn commit(self: &Arc<Self>, snapshot: Snapshot, action: Option<ActionPayload>) -> Snapshot {
        self.local.write_snapshot(&snapshot);
        if let Some(payload) = action {
            self.pending.append(payload);
            self.spawn_drain();
        }
        snapshot
    }

    /// Spawns a background drain when reachable. The caller is never
    /// blocked waiting on remote I/O.
    pub fn spawn_drain(self: &Arc<Self>) {
        if !self.is_reachable() {
            return;
        }
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.drain().await;
        });
    }

    /// Reacts to reachability edges: exactly one drain-and-reload cycle per
    /// became-reachable transition.
    ///
    /// Subscribes before returning the future, not inside it: a transition
    /// published between spawning the watcher and its first poll would
    /// otherwise be marked already-seen and the edge lost.
    pub fn watch_reachability(self: Arc<Self>) -> impl Future<Output = ()> + Send {
        let mut rx = self.connectivity.watch();
        let mut was_reachable = *rx.borrow_and_update();
        async move {
            while rx.changed().await.is_ok() {
                let reachable = *rx.borrow_and_update();
                if reachable && !was_reachable {
                    tracing::info!("Server reachable again, syncing");
                    self.sync_now().await;
                }
                was_reachable = reachable;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exercise, MuscleGroup, SetScheme, WorkoutType};
    use crate::remote::{MemoryRemote, Table};
    use crate::sync::ManualConnectivity;
    use serde_json::Value;
    use tempfile::TempDir;
    use tokio::sync::Semaphore;

    /// Remote whose inserts park on a semaphore, to hold a drain mid-flight.
    #[derive(Debug, Clone)]
    struct GatedRemote {
        inner: MemoryRemote,
        gate: Arc<Semaphore>,
    }

    impl RemoteStore for GatedRemote {
        async fn select_all(&self, table: Table) -> Result<Vec<Value>, RemoteError> {
            self.inner.select_all(table).await
        }

        async fn select_by_id(&self, table: Table, id: &str) -> Result<Option<Value>, RemoteError> {
            self.inner.select_by_id(table, id).await
        }

        async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<(), RemoteError> {
            self.gate
                .acquire()
                .await
                .map_err(|_| RemoteError::Unavailable)?
                .forget();
            self.inner.insert(table, rows).await
        }

        async fn upsert(&self, table: Table, row: Value) -> Result<(), RemoteError> {
            self.inner.upsert(table, row).await
        }

        async fn update(&self, table: Table, id: &str, changes: Value) -> Result<(), RemoteError> {
            self.inner.update(table, id, changes).await
        }

        async fn delete(&self, table: Table, id: &str) -> Result<(), RemoteError> {
            self.inner.delete(table, id).await
        }

        async fn delete_all(&self, table: Table) -> Result<(), RemoteError> {
            self.inner.delete_all(table).await
        }
    }

    fn engine(
        reachable: bool,
    ) -> (
        Arc<SyncEngine<MemoryRemote, ManualConnectivity>>,
        MemoryRemote,
        ManualConnectivity,
        TempDir,
    ) {
        let temp = TempDir::new().unwrap();
        let remote = MemoryRemote::new();
        let connectivity = ManualConnectivity::new(reachable);
        let engine = Arc::new(SyncEngine::new(
            LocalStore::new(temp.path()),
            PendingLog::new(temp.path()),
            remote.clone(),
            connectivity.clone(),
        ));
        (engine, remote, connectivity, temp)
    }

    fn sample_exercise() -> Exercise {
        Exercise::new(
            "Cable Rows",
            MuscleGroup::Back,
            WorkoutType::Pull,
            SetScheme::FourSets,
        )
    }

    #[tokio::test]
    async fn test_offline_load_is_idempotent() {
        let (engine, _remote, _conn, _temp) = engine(false);
        let a = serde_json::to_string(&engine.load().await).unwrap();
        let b = serde_json::to_string(&engine.load().await).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_offline_commit_queues_without_draining() {
        let (engine, remote, _conn, _temp) = engine(false);
        let mut snapshot = engine.read_local();
        snapshot.exercises.push(sample_exercise());
        let exercise = snapshot.exercises.last().unwrap().clone();

        engine.commit(snapshot, Some(ActionPayload::AddExercise(exercise)));

        assert_eq!(engine.pending_count(), 1);
        assert_eq!(engine.state(), SyncState::Offline);
        assert!(remote.rows(Table::Exercises).is_empty());
    }

    #[tokio::test]
    async fn test_drain_is_noop_when_offline() {
        let (engine, _remote, _conn, _temp) = engine(false);
        engine
            .pending
            .append(ActionPayload::AddExercise(sample_exercise()));

        assert_eq!(engine.drain().await, 0);
        assert_eq!(engine.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_online_drain_applies_and_clears() {
        let (engine, remote, _conn, _temp) = engine(true);
        for _ in 0..3 {
            engine
                .pending
                .append(ActionPayload::AddExercise(sample_exercise()));
        }
        assert_eq!(engine.state(), SyncState::OnlinePendingSync);

        assert_eq!(engine.drain().await, 3);
        assert_eq!(engine.pending_count(), 0);
        assert_eq!(engine.state(), SyncState::OnlineSynced);
        assert_eq!(remote.rows(Table::Exercises).len(), 3);
    }

    #[tokio::test]
    async fn test_failed_action_is_dropped_after_drain() {
        let (engine, remote, _conn, _temp) = engine(true);
        engine
            .pending
            .append(ActionPayload::AddExercise(sample_exercise()));

        // Reachable per the oracle, but the store itself errors
        remote.set_failing(true);
        assert_eq!(engine.drain().await, 1);

        // The log clears as a unit; the failed action is not retried
        assert_eq!(engine.pending_count(), 0);
        remote.set_failing(false);
        assert!(remote.rows(Table::Exercises).is_empty());
    }

    #[tokio::test]
    async fn test_online_load_pulls_remote_and_caches() {
        let (engine, _remote, _conn, temp) = engine(true);
        let snapshot = engine.load().await;
        assert!(!snapshot.exercises.is_empty());

        // Local cache now mirrors the remote ids
        let cached = LocalStore::new(temp.path()).read_snapshot();
        assert_eq!(cached.exercises[0].id, snapshot.exercises[0].id);
    }

    #[tokio::test]
    async fn test_online_load_falls_back_to_local_on_remote_error() {
        let (engine, remote, _conn, _temp) = engine(true);
        let local = engine.load().await;

        remote.set_failing(true);
        let fallback = engine.load().await;
        assert_eq!(
            serde_json::to_string(&fallback).unwrap(),
            serde_json::to_string(&local).unwrap()
        );
    }

    #[tokio::test]
    async fn test_load_drains_before_pull() {
        let (engine, _remote, _conn, _temp) = engine(true);
        let exercise = sample_exercise();
        let id = exercise.id;
        engine.pending.append(ActionPayload::AddExercise(exercise));

        let snapshot = engine.load().await;
        assert!(snapshot.exercises.iter().any(|ex| ex.id == id));
        assert_eq!(engine.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_mid_drain_append_survives_for_next_pass() {
        let temp = TempDir::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let remote = GatedRemote {
            inner: MemoryRemote::new(),
            gate: Arc::clone(&gate),
        };
        let engine = Arc::new(SyncEngine::new(
            LocalStore::new(temp.path()),
            PendingLog::new(temp.path()),
            remote,
            ManualConnectivity::new(true),
        ));

        engine
            .pending
            .append(ActionPayload::AddExercise(sample_exercise()));
        let drain = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.drain().await }
        });
        // Let the drain capture its snapshot and park on the remote call
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        engine.pending.append(ActionPayload::ResetAll);
        gate.add_permits(1);
        assert_eq!(drain.await.unwrap(), 1);

        let remaining = engine.pending.all();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].payload.kind(), "reset_data");
    }

    #[tokio::test]
    async fn test_became_reachable_triggers_one_sync() {
        let (engine, remote, conn, _temp) = engine(false);
        let exercise = sample_exercise();
        let id = exercise.id;
        engine.pending.append(ActionPayload::AddExercise(exercise));

        let watcher = tokio::spawn(Arc::clone(&engine).watch_reachability());
        conn.set_reachable(true);

        // Wait for the watcher to run its cycle
        for _ in 0..100 {
            if engine.pending_count() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(engine.pending_count(), 0);
        assert!(remote
            .rows(Table::Exercises)
            .iter()
            .any(|row| row["id"] == id.to_string()));
        watcher.abort();
    }

    #[tokio::test]
    async fn test_state_display() {
        assert_eq!(SyncState::Offline.to_string(), "offline");
        assert_eq!(SyncState::OnlineSynced.to_string(), "synced");
        assert_eq!(SyncState::OnlinePendingSync.to_string(), "pending sync");
    }
}
