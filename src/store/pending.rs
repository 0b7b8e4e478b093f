use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::{BodyWeightEntry, Exercise, ExerciseUpdate, Workout, WorkoutEntry};

use super::local::StoreError;

/// Payload of a queued mutation, one variant per action kind.
///
/// Wire names are frozen so an existing `pending.json` keeps
/// deserializing across upgrades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ActionPayload {
    AddExercise(Exercise),
    #[serde(rename_all = "camelCase")]
    UpdateExercise {
        exercise_id: Uuid,
        updates: ExerciseUpdate,
        updated_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    DeleteExercise { exercise_id: Uuid },
    CompleteWorkout {
        workout: Workout,
        entries: Vec<WorkoutEntry>,
    },
    #[serde(rename_all = "camelCase")]
    DeleteWorkout { workout_id: Uuid },
    AddBodyWeight(BodyWeightEntry),
    #[serde(rename_all = "camelCase")]
    DeleteBodyWeight { entry_id: Uuid },
    /// Placeholder: a full reset is applied out-of-band, not via the queue.
    #[serde(rename = "reset_data")]
    ResetAll,
}

impl ActionPayload {
    /// Wire name of the action kind, for logs and status output.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionPayload::AddExercise(_) => "add_exercise",
            ActionPayload::UpdateExercise { .. } => "update_exercise",
            ActionPayload::DeleteExercise { .. } => "delete_exercise",
            ActionPayload::CompleteWorkout { .. } => "complete_workout",
            ActionPayload::DeleteWorkout { .. } => "delete_workout",
            ActionPayload::AddBodyWeight(_) => "add_body_weight",
            ActionPayload::DeleteBodyWeight { .. } => "delete_body_weight",
            ActionPayload::ResetAll => "reset_data",
        }
    }
}

/// A queued mutation awaiting remote confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: Uuid,
    #[serde(flatten)]
    pub payload: ActionPayload,
    pub timestamp: DateTime<Utc>,
}

/// Append-only, locally persisted queue of mutations.
///
/// Actions replay in FIFO enqueue order. The log is cleared as a unit after
/// a full drain attempt, never per item.
#[derive(Debug, Clone)]
pub struct PendingLog {
    data_dir: PathBuf,
}

impl PendingLog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join("pending.json")
    }

    /// All queued actions in enqueue order. A missing or corrupt file reads
    /// as an empty queue.
    pub fn all(&self) -> Vec<PendingAction> {
        let path = self.path();
        if !path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read pending log {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Appends a new action stamped with a fresh id and enqueue time.
    pub fn append(&self, payload: ActionPayload) {
        let mut actions = self.all();
        actions.push(PendingAction {
            id: Uuid::new_v4(),
            payload,
            timestamp: Utc::now(),
        });
        if let Err(e) = self.save(&actions) {
            tracing::warn!("Failed to persist pending action: {}", e);
        }
    }

    /// Drops the first `count` actions, keeping anything appended after the
    /// caller snapshotted the log.
    pub fn remove_first(&self, count: usize) {
        let actions = self.all();
        if count >= actions.len() {
            self.clear();
            return;
        }
        if let Err(e) = self.save(&actions[count..]) {
            tracing::warn!("Failed to truncate pending log: {}", e);
        }
    }

    /// Drops the entire log.
    pub fn clear(&self) {
        let path = self.path();
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to clear pending log {}: {}", path.display(), e);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save(&self, actions: &[PendingAction]) -> Result<(), StoreError> {
        let path = self.path();
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StoreError::IoError(self.data_dir.clone(), e))?;
        let contents = serde_json::to_string(actions)
            .map_err(|e| StoreError::SerdeError(path.clone(), e))?;
        fs::write(&path, contents).map_err(|e| StoreError::IoError(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MuscleGroup, SetScheme, WorkoutType};
    use tempfile::TempDir;

    fn test_log() -> (PendingLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log = PendingLog::new(temp_dir.path());
        (log, temp_dir)
    }

    fn sample_exercise() -> Exercise {
        Exercise::new(
            "Lat Pulldown",
            MuscleGroup::Back,
            WorkoutType::Pull,
            SetScheme::FourSets,
        )
    }

    #[test]
    fn test_empty_log() {
        let (log, _temp) = test_log();
        assert!(log.is_empty());
        assert!(log.all().is_empty());
    }

    #[test]
    fn test_append_preserves_fifo_order() {
        let (log, _temp) = test_log();
        log.append(ActionPayload::AddExercise(sample_exercise()));
        log.append(ActionPayload::DeleteExercise {
            exercise_id: Uuid::new_v4(),
        });
        log.append(ActionPayload::ResetAll);

        let actions = log.all();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0].payload.kind(), "add_exercise");
        assert_eq!(actions[1].payload.kind(), "delete_exercise");
        assert_eq!(actions[2].payload.kind(), "reset_data");
    }

    #[test]
    fn test_remove_first_keeps_later_appends() {
        let (log, _temp) = test_log();
        log.append(ActionPayload::AddExercise(sample_exercise()));
        log.append(ActionPayload::ResetAll);
        let snapshot_len = log.len();

        // Appended after the snapshot was taken, must survive the drop
        log.append(ActionPayload::AddBodyWeight(BodyWeightEntry::new(
            80.0,
            Utc::now(),
        )));

        log.remove_first(snapshot_len);
        let remaining = log.all();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].payload.kind(), "add_body_weight");

        // Dropping more than the log holds just empties it
        log.remove_first(10);
        assert!(log.is_empty());
    }

    #[test]
    fn test_clear_empties_log() {
        let (log, _temp) = test_log();
        log.append(ActionPayload::ResetAll);
        assert_eq!(log.len(), 1);

        log.clear();
        assert!(log.is_empty());
        // Clearing an already-empty log is fine
        log.clear();
    }

    #[test]
    fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let log = PendingLog::new(temp_dir.path());
            log.append(ActionPayload::AddBodyWeight(BodyWeightEntry::new(
                80.0,
                Utc::now(),
            )));
        }
        let reopened = PendingLog::new(temp_dir.path());
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.all()[0].payload.kind(), "add_body_weight");
    }

    #[test]
    fn test_corrupt_log_reads_as_empty() {
        let (log, _temp) = test_log();
        std::fs::create_dir_all(log.data_dir.clone()).unwrap();
        std::fs::write(log.path(), "[{broken").unwrap();
        assert!(log.all().is_empty());
    }

    #[test]
    fn test_action_wire_format() {
        let action = PendingAction {
            id: Uuid::new_v4(),
            payload: ActionPayload::DeleteBodyWeight {
                entry_id: Uuid::new_v4(),
            },
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"type\":\"delete_body_weight\""));
        assert!(json.contains("\"entryId\""));

        let parsed: PendingAction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.payload.kind(), "delete_body_weight");
    }

    #[test]
    fn test_update_exercise_payload_roundtrip() {
        let (log, _temp) = test_log();
        log.append(ActionPayload::UpdateExercise {
            exercise_id: Uuid::new_v4(),
            updates: ExerciseUpdate {
                max_weight: Some(Some(40.0)),
                ..Default::default()
            },
            updated_at: Utc::now(),
        });

        match &log.all()[0].payload {
            ActionPayload::UpdateExercise { updates, .. } => {
                assert_eq!(updates.max_weight, Some(Some(40.0)));
            }
            other => panic!("unexpected payload: {}", other.kind()),
        }
    }
}
