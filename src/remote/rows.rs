//! Flattened row representations of the remote schema.
//!
//! Field names follow the remote snake_case convention; conversions to and
//! from the camelCase in-memory models all live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    BodyWeightEntry, Exercise, MuscleGroup, SetScheme, Workout, WorkoutEntry, WorkoutType,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRow {
    pub id: Uuid,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub workout_type: WorkoutType,
    pub set_scheme: SetScheme,
    pub max_weight: Option<f64>,
    pub is_bodyweight: bool,
    pub last_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Exercise> for ExerciseRow {
    fn from(ex: &Exercise) -> Self {
        Self {
            id: ex.id,
            name: ex.name.clone(),
            muscle_group: ex.muscle_group,
            workout_type: ex.workout_type,
            set_scheme: ex.set_scheme,
            max_weight: ex.max_weight,
            is_bodyweight: ex.is_bodyweight,
            last_note: ex.last_note.clone(),
            created_at: ex.created_at,
            updated_at: ex.updated_at,
        }
    }
}

impl From<ExerciseRow> for Exercise {
    fn from(row: ExerciseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            muscle_group: row.muscle_group,
            workout_type: row.workout_type,
            set_scheme: row.set_scheme,
            max_weight: row.max_weight,
            is_bodyweight: row.is_bodyweight,
            last_note: row.last_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRow {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub date: DateTime<Utc>,
    pub completed: bool,
}

impl WorkoutRow {
    /// The row for a completed workout; entries travel in their own table.
    pub fn completed(workout: &Workout) -> Self {
        Self {
            id: workout.id,
            workout_type: workout.workout_type,
            date: workout.date,
            completed: true,
        }
    }

    pub fn into_workout(self, entries: Vec<WorkoutEntry>) -> Workout {
        Workout {
            id: self.id,
            workout_type: self.workout_type,
            date: self.date,
            entries,
            completed: self.completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutEntryRow {
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub weight: Option<f64>,
    pub is_bodyweight: Option<bool>,
    pub note: Option<String>,
}

impl WorkoutEntryRow {
    pub fn new(workout_id: Uuid, entry: &WorkoutEntry) -> Self {
        Self {
            workout_id,
            exercise_id: entry.exercise_id,
            weight: entry.weight,
            is_bodyweight: entry.is_bodyweight,
            note: entry.note.clone(),
        }
    }
}

impl From<WorkoutEntryRow> for WorkoutEntry {
    fn from(row: WorkoutEntryRow) -> Self {
        Self {
            exercise_id: row.exercise_id,
            weight: row.weight,
            is_bodyweight: row.is_bodyweight,
            note: row.note,
            clear_note: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyWeightRow {
    pub id: Uuid,
    pub weight: f64,
    pub date: DateTime<Utc>,
}

impl From<&BodyWeightEntry> for BodyWeightRow {
    fn from(entry: &BodyWeightEntry) -> Self {
        Self {
            id: entry.id,
            weight: entry.weight,
            date: entry.date,
        }
    }
}

impl From<BodyWeightRow> for BodyWeightEntry {
    fn from(row: BodyWeightRow) -> Self {
        Self {
            id: row.id,
            weight: row.weight,
            date: row.date,
        }
    }
}

/// Single-row record holding the two "last workout" pointers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStateRow {
    pub id: i64,
    pub last_pull_workout_id: Option<Uuid>,
    pub last_push_workout_id: Option<Uuid>,
}

impl AppStateRow {
    /// The fixed id of the singleton row.
    pub const SINGLETON_ID: &'static str = "1";

    pub fn empty() -> Self {
        Self {
            id: 1,
            last_pull_workout_id: None,
            last_push_workout_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_row_uses_snake_case() {
        let ex = Exercise::new(
            "Rack Pull",
            MuscleGroup::Back,
            WorkoutType::Pull,
            SetScheme::FourSets,
        )
        .with_max_weight(130.0);
        let json = serde_json::to_string(&ExerciseRow::from(&ex)).unwrap();
        assert!(json.contains("\"muscle_group\""));
        assert!(json.contains("\"max_weight\""));
        assert!(json.contains("\"is_bodyweight\""));
        assert!(!json.contains("muscleGroup"));
    }

    #[test]
    fn test_exercise_roundtrip_preserves_id() {
        let ex = Exercise::new(
            "Pull Ups",
            MuscleGroup::Back,
            WorkoutType::Pull,
            SetScheme::ThreeByFive,
        )
        .bodyweight();
        let row = ExerciseRow::from(&ex);
        let back = Exercise::from(row);
        assert_eq!(back.id, ex.id);
        assert!(back.is_bodyweight);
        assert_eq!(back.max_weight, None);
    }

    #[test]
    fn test_workout_row_always_completed() {
        let workout = Workout::new(WorkoutType::Push);
        let row = WorkoutRow::completed(&workout);
        assert!(row.completed);

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"type\":\"push\""));
    }

    #[test]
    fn test_entry_row_carries_workout_id() {
        let workout_id = Uuid::new_v4();
        let entry = WorkoutEntry::new(Uuid::new_v4(), Some(50.0)).with_note("plates");
        let row = WorkoutEntryRow::new(workout_id, &entry);
        assert_eq!(row.workout_id, workout_id);

        let back = WorkoutEntry::from(row);
        assert_eq!(back.exercise_id, entry.exercise_id);
        assert_eq!(back.weight, Some(50.0));
        assert!(!back.clear_note);
    }

    #[test]
    fn test_app_state_row_shape() {
        let json = serde_json::to_string(&AppStateRow::empty()).unwrap();
        assert!(json.contains("\"last_pull_workout_id\":null"));
        assert!(json.contains("\"last_push_workout_id\":null"));
    }
}
