//! The application facade: the single entry point the UI layer consumes.
//!
//! Every mutating operation applies to the local store synchronously,
//! queues the mutation and lets the engine reconcile with the remote store
//! in the background. From the caller's point of view mutations are total:
//! failures only ever show up as degraded sync status.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    BodyWeightEntry, Exercise, ExerciseUpdate, Snapshot, Workout, WorkoutEntry, WorkoutType,
};
use crate::remote::RemoteStore;
use crate::store::{ActionPayload, LocalStore, PendingLog};
use crate::sync::{Connectivity, SyncEngine, SyncState};

pub struct App<R, C> {
    engine: Arc<SyncEngine<R, C>>,
}

impl<R: RemoteStore, C: Connectivity> App<R, C> {
    /// Builds the facade over a data directory. Each instance owns its own
    /// store and log, so tests construct isolated apps in temp dirs.
    pub fn new(data_dir: impl Into<PathBuf>, remote: R, connectivity: C) -> Self {
        let data_dir = data_dir.into();
        let engine = Arc::new(SyncEngine::new(
            LocalStore::new(&data_dir),
            PendingLog::new(&data_dir),
            remote,
            connectivity,
        ));
        Self { engine }
    }

    /// Startup load: drain, pull and cache when reachable, local otherwise.
    pub async fn load(&self) -> Snapshot {
        self.engine.load().await
    }

    /// User-initiated retry; one full drain-and-reload cycle.
    pub async fn sync_now(&self) -> Snapshot {
        self.engine.sync_now().await
    }

    /// The current local snapshot without touching the remote.
    pub fn snapshot(&self) -> Snapshot {
        self.engine.read_local()
    }

    pub fn pending_count(&self) -> usize {
        self.engine.pending_count()
    }

    pub fn is_reachable(&self) -> bool {
        self.engine.is_reachable()
    }

    pub fn state(&self) -> SyncState {
        self.engine.state()
    }

    /// Runs the became-reachable handler for the life of the process.
    pub fn spawn_reachability_watcher(&self) {
        tokio::spawn(Arc::clone(&self.engine).watch_reachability());
    }

    pub fn add_exercise(&self, exercise: Exercise) -> Snapshot {
        let mut snapshot = self.engine.read_local();
        snapshot.exercises.push(exercise.clone());
        self.engine
            .commit(snapshot, Some(ActionPayload::AddExercise(exercise)))
    }

    pub fn update_exercise(&self, exercise_id: Uuid, updates: ExerciseUpdate) -> Snapshot {
        let now = Utc::now();
        let mut snapshot = self.engine.read_local();
        for exercise in snapshot
            .exercises
            .iter_mut()
            .filter(|ex| ex.id == exercise_id)
        {
            exercise.apply_update(&updates, now);
        }
        self.engine.commit(
            snapshot,
            Some(ActionPayload::UpdateExercise {
                exercise_id,
                updates,
                updated_at: now,
            }),
        )
    }

    pub fn delete_exercise(&self, exercise_id: Uuid) -> Snapshot {
        let mut snapshot = self.engine.read_local();
        snapshot.exercises.retain(|ex| ex.id != exercise_id);
        self.engine
            .commit(snapshot, Some(ActionPayload::DeleteExercise { exercise_id }))
    }

    /// Starts a session. Incomplete workouts are local-only: nothing is
    /// queued until the workout completes.
    pub fn start_workout(&self, workout_type: WorkoutType) -> (Snapshot, Workout) {
        let workout = Workout::new(workout_type);
        let mut snapshot = self.engine.read_local();
        snapshot.workouts.push(workout.clone());
        let snapshot = self.engine.commit(snapshot, None);
        (snapshot, workout)
    }

    /// Completes a session: folds the entries into each exercise's derived
    /// fields, marks the workout completed and moves its category pointer.
    /// An unknown workout id leaves the snapshot untouched.
    pub fn complete_workout(&self, workout_id: Uuid, entries: Vec<WorkoutEntry>) -> Snapshot {
        let mut snapshot = self.engine.read_local();
        let Some(position) = snapshot.workouts.iter().position(|w| w.id == workout_id) else {
            return snapshot;
        };
        let workout_type = snapshot.workouts[position].workout_type;
        let now = Utc::now();

        for entry in &entries {
            if let Some(exercise) = snapshot
                .exercises
                .iter_mut()
                .find(|ex| ex.id == entry.exercise_id)
            {
                exercise.record_entry(entry, now);
            }
        }

        let workout = &mut snapshot.workouts[position];
        workout.entries = entries.clone();
        workout.completed = true;
        let completed = workout.clone();

        match workout_type {
            WorkoutType::Pull => snapshot.last_pull_workout_id = Some(workout_id),
            WorkoutType::Push => snapshot.last_push_workout_id = Some(workout_id),
        }

        self.engine.commit(
            snapshot,
            Some(ActionPayload::CompleteWorkout {
                workout: completed,
                entries,
            }),
        )
    }

    /// Abandons an incomplete session. Never queued: the workout was never
    /// remotely visible.
    pub fn cancel_workout(&self, workout_id: Uuid) -> Snapshot {
        let mut snapshot = self.engine.read_local();
        snapshot.workouts.retain(|w| w.id != workout_id);
        self.engine.commit(snapshot, None)
    }

    /// Removes a workout from the history, clearing any category pointer
    /// that referred to it.
    pub fn delete_workout(&self, workout_id: Uuid) -> Snapshot {
        let mut snapshot = self.engine.read_local();
        snapshot.workouts.retain(|w| w.id != workout_id);
        if snapshot.last_pull_workout_id == Some(workout_id) {
            snapshot.last_pull_workout_id = None;
        }
        if snapshot.last_push_workout_id == Some(workout_id) {
            snapshot.last_push_workout_id = None;
        }
        self.engine
            .commit(snapshot, Some(ActionPayload::DeleteWorkout { workout_id }))
    }

    pub fn add_body_weight(&self, weight: f64, date: Option<DateTime<Utc>>) -> Snapshot {
        let entry = BodyWeightEntry::new(weight, date.unwrap_or_else(Utc::now));
        let mut snapshot = self.engine.read_local();
        snapshot.body_weight_history.push(entry.clone());
        self.engine
            .commit(snapshot, Some(ActionPayload::AddBodyWeight(entry)))
    }

    pub fn delete_body_weight(&self, entry_id: Uuid) -> Snapshot {
        let mut snapshot = self.engine.read_local();
        snapshot.body_weight_history.retain(|e| e.id != entry_id);
        self.engine
            .commit(snapshot, Some(ActionPayload::DeleteBodyWeight { entry_id }))
    }

    /// Full reset: reseed locally, drop the queue, and when reachable wipe
    /// and reseed the remote too, returning its fresh snapshot.
    pub async fn reset_all(&self) -> Snapshot {
        let seeded = Snapshot::seeded();
        self.engine.write_local(&seeded);
        self.engine.clear_pending();

        if self.engine.is_reachable() {
            match self.engine.reset_remote().await {
                Ok(fresh) => {
                    self.engine.write_local(&fresh);
                    return fresh;
                }
                Err(e) => {
                    tracing::warn!("Remote reset failed, keeping local seed: {}", e);
                }
            }
        }
        seeded
    }

    pub fn last_workout(&self, workout_type: WorkoutType) -> Option<Workout> {
        self.snapshot().last_workout(workout_type).cloned()
    }

    pub fn exercise_by_id(&self, id: Uuid) -> Option<Exercise> {
        self.snapshot().exercise_by_id(id).cloned()
    }

    pub fn latest_body_weight(&self) -> Option<BodyWeightEntry> {
        self.snapshot().latest_body_weight().cloned()
    }
}
