//! Maps queued actions and snapshot pulls onto remote row operations.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Snapshot, Workout, WorkoutEntry, WorkoutType};
use crate::store::{ActionPayload, PendingAction};

use super::rows::{AppStateRow, BodyWeightRow, ExerciseRow, WorkoutEntryRow, WorkoutRow};
use super::{RemoteError, RemoteStore, Table};

fn to_row<T: Serialize>(table: Table, value: &T) -> Result<Value, RemoteError> {
    serde_json::to_value(value).map_err(|e| RemoteError::Decode(table.name(), e.to_string()))
}

fn from_row<T: DeserializeOwned>(table: Table, value: Value) -> Result<T, RemoteError> {
    serde_json::from_value(value).map_err(|e| RemoteError::Decode(table.name(), e.to_string()))
}

/// Translates each pending action into its remote table operations and
/// assembles full snapshots from remote rows.
///
/// A multi-table action (complete-workout, reset) is not atomic: a failure
/// mid-sequence leaves the remote partially updated.
#[derive(Debug, Clone)]
pub struct RemoteAdapter<R> {
    store: R,
}

impl<R: RemoteStore> RemoteAdapter<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    /// Applies one queued action against the remote store.
    pub async fn apply(&self, action: &PendingAction) -> Result<(), RemoteError> {
        match &action.payload {
            ActionPayload::AddExercise(exercise) => {
                // The locally generated id goes to the remote as-is so both
                // copies stay addressable under the same key.
                let row = to_row(Table::Exercises, &ExerciseRow::from(exercise))?;
                self.store.insert(Table::Exercises, vec![row]).await
            }
            ActionPayload::UpdateExercise {
                exercise_id,
                updates,
                updated_at,
            } => {
                let mut changes = Map::new();
                changes.insert("updated_at".to_string(), json!(updated_at));
                if let Some(name) = &updates.name {
                    changes.insert("name".to_string(), json!(name));
                }
                if let Some(scheme) = updates.set_scheme {
                    changes.insert("set_scheme".to_string(), json!(scheme));
                }
                if let Some(max_weight) = updates.max_weight {
                    changes.insert("max_weight".to_string(), json!(max_weight));
                }
                if let Some(is_bodyweight) = updates.is_bodyweight {
                    changes.insert("is_bodyweight".to_string(), json!(is_bodyweight));
                }
                if let Some(last_note) = &updates.last_note {
                    changes.insert("last_note".to_string(), json!(last_note));
                }
                self.store
                    .update(
                        Table::Exercises,
                        &exercise_id.to_string(),
                        Value::Object(changes),
                    )
                    .await
            }
            ActionPayload::DeleteExercise { exercise_id } => {
                self.store
                    .delete(Table::Exercises, &exercise_id.to_string())
                    .await
            }
            ActionPayload::CompleteWorkout { workout, entries } => {
                self.apply_complete_workout(workout, entries).await
            }
            ActionPayload::DeleteWorkout { workout_id } => {
                self.store
                    .delete(Table::Workouts, &workout_id.to_string())
                    .await
            }
            ActionPayload::AddBodyWeight(entry) => {
                let row = to_row(Table::BodyWeightHistory, &BodyWeightRow::from(entry))?;
                self.store.insert(Table::BodyWeightHistory, vec![row]).await
            }
            ActionPayload::DeleteBodyWeight { entry_id } => {
                self.store
                    .delete(Table::BodyWeightHistory, &entry_id.to_string())
                    .await
            }
            // Reset travels out-of-band as a direct wipe-and-reseed; the
            // queued form is a placeholder and applies nothing.
            ActionPayload::ResetAll => Ok(()),
        }
    }

    async fn apply_complete_workout(
        &self,
        workout: &Workout,
        entries: &[WorkoutEntry],
    ) -> Result<(), RemoteError> {
        let row = to_row(Table::Workouts, &WorkoutRow::completed(workout))?;
        self.store.upsert(Table::Workouts, row).await?;

        if !entries.is_empty() {
            let rows = entries
                .iter()
                .map(|e| to_row(Table::WorkoutEntries, &WorkoutEntryRow::new(workout.id, e)))
                .collect::<Result<Vec<_>, _>>()?;
            self.store.insert(Table::WorkoutEntries, rows).await?;
        }

        let pointer = match workout.workout_type {
            WorkoutType::Pull => json!({ "last_pull_workout_id": workout.id }),
            WorkoutType::Push => json!({ "last_push_workout_id": workout.id }),
        };
        self.store
            .update(Table::AppState, AppStateRow::SINGLETON_ID, pointer)
            .await?;

        for entry in entries {
            self.apply_entry_stats(entry).await?;
        }
        Ok(())
    }

    /// Refreshes one exercise's derived fields after a completed entry.
    ///
    /// The max weight comparison reads the current remote value first: the
    /// snapshot captured at enqueue time may be stale relative to writes
    /// from another device.
    async fn apply_entry_stats(&self, entry: &WorkoutEntry) -> Result<(), RemoteError> {
        let exercise_id = entry.exercise_id.to_string();
        let mut changes = Map::new();
        changes.insert("updated_at".to_string(), json!(Utc::now()));

        let is_bodyweight = entry.is_bodyweight.unwrap_or(false);
        if is_bodyweight {
            changes.insert("max_weight".to_string(), Value::Null);
        } else if let Some(weight) = entry.weight {
            let current = self
                .store
                .select_by_id(Table::Exercises, &exercise_id)
                .await?;
            if let Some(row) = current {
                let row: ExerciseRow = from_row(Table::Exercises, row)?;
                if row.max_weight.map_or(true, |max| weight > max) {
                    changes.insert("max_weight".to_string(), json!(weight));
                }
            }
        }
        if let Some(bw) = entry.is_bodyweight {
            changes.insert("is_bodyweight".to_string(), json!(bw));
        }
        if let Some(note) = entry.note.as_deref().filter(|n| !n.is_empty()) {
            changes.insert("last_note".to_string(), json!(note));
        }

        self.store
            .update(Table::Exercises, &exercise_id, Value::Object(changes))
            .await
    }

    /// Pulls the full remote snapshot: all five tables, entries grouped by
    /// workout, collections ordered chronologically.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, RemoteError> {
        let mut exercises: Vec<ExerciseRow> = self
            .store
            .select_all(Table::Exercises)
            .await?
            .into_iter()
            .map(|v| from_row(Table::Exercises, v))
            .collect::<Result<_, _>>()?;
        exercises.sort_by_key(|row| row.created_at);

        let mut workouts: Vec<WorkoutRow> = self
            .store
            .select_all(Table::Workouts)
            .await?
            .into_iter()
            .map(|v| from_row(Table::Workouts, v))
            .collect::<Result<_, _>>()?;
        workouts.sort_by_key(|row| row.date);

        let entry_rows: Vec<WorkoutEntryRow> = self
            .store
            .select_all(Table::WorkoutEntries)
            .await?
            .into_iter()
            .map(|v| from_row(Table::WorkoutEntries, v))
            .collect::<Result<_, _>>()?;
        let mut entries_by_workout: HashMap<Uuid, Vec<WorkoutEntry>> = HashMap::new();
        for row in entry_rows {
            entries_by_workout
                .entry(row.workout_id)
                .or_default()
                .push(WorkoutEntry::from(row));
        }

        let mut body_weight: Vec<BodyWeightRow> = self
            .store
            .select_all(Table::BodyWeightHistory)
            .await?
            .into_iter()
            .map(|v| from_row(Table::BodyWeightHistory, v))
            .collect::<Result<_, _>>()?;
        body_weight.sort_by_key(|row| row.date);

        let app_state = match self
            .store
            .select_by_id(Table::AppState, AppStateRow::SINGLETON_ID)
            .await?
        {
            Some(row) => from_row(Table::AppState, row)?,
            None => AppStateRow::empty(),
        };

        Ok(Snapshot {
            exercises: exercises.into_iter().map(Into::into).collect(),
            workouts: workouts
                .into_iter()
                .map(|row| {
                    let entries = entries_by_workout.remove(&row.id).unwrap_or_default();
                    row.into_workout(entries)
                })
                .collect(),
            last_pull_workout_id: app_state.last_pull_workout_id,
            last_push_workout_id: app_state.last_push_workout_id,
            body_weight_history: body_weight.into_iter().map(Into::into).collect(),
        })
    }

    /// Seeds the remote with the default catalog when it holds no exercises.
    pub async fn seed_if_empty(&self) -> Result<(), RemoteError> {
        if !self.store.select_all(Table::Exercises).await?.is_empty() {
            return Ok(());
        }
        tracing::info!("Remote store is empty, seeding default data");

        let seed = Snapshot::seeded();
        let exercise_rows = seed
            .exercises
            .iter()
            .map(|ex| to_row(Table::Exercises, &ExerciseRow::from(ex)))
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert(Table::Exercises, exercise_rows).await?;

        let weight_rows = seed
            .body_weight_history
            .iter()
            .map(|entry| to_row(Table::BodyWeightHistory, &BodyWeightRow::from(entry)))
            .collect::<Result<Vec<_>, _>>()?;
        self.store
            .insert(Table::BodyWeightHistory, weight_rows)
            .await?;

        let state = to_row(Table::AppState, &AppStateRow::empty())?;
        self.store.upsert(Table::AppState, state).await
    }

    /// Wipes the four data tables, clears both pointers and reseeds.
    /// Sequential table writes, so a mid-sequence failure leaves the remote
    /// partially reset.
    pub async fn wipe_and_reseed(&self) -> Result<(), RemoteError> {
        self.store.delete_all(Table::WorkoutEntries).await?;
        self.store.delete_all(Table::Workouts).await?;
        self.store.delete_all(Table::Exercises).await?;
        self.store.delete_all(Table::BodyWeightHistory).await?;
        self.store
            .update(
                Table::AppState,
                AppStateRow::SINGLETON_ID,
                json!({ "last_pull_workout_id": null, "last_push_workout_id": null }),
            )
            .await?;
        self.seed_if_empty().await
    }
}
