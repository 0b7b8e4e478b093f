use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::exercise::WorkoutType;

/// One exercise performed during a workout. Entries only exist inside a
/// workout's sequence and are never addressed on their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    pub exercise_id: Uuid,
    pub weight: Option<f64>,
    /// Overrides the exercise's bodyweight flag when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bodyweight: Option<bool>,
    pub note: Option<String>,
    /// Directive to drop the exercise's previous note, even if `note` is set
    /// to an empty string.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clear_note: bool,
}

impl WorkoutEntry {
    pub fn new(exercise_id: Uuid, weight: Option<f64>) -> Self {
        Self {
            exercise_id,
            weight,
            is_bodyweight: None,
            note: None,
            clear_note: false,
        }
    }

    pub fn bodyweight(mut self) -> Self {
        self.is_bodyweight = Some(true);
        self.weight = None;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn clearing_note(mut self) -> Self {
        self.clear_note = true;
        self
    }
}

/// A training session. Starts incomplete; completing it is the only
/// transition that makes it eligible for remote persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub date: DateTime<Utc>,
    pub entries: Vec<WorkoutEntry>,
    pub completed: bool,
}

impl Workout {
    pub fn new(workout_type: WorkoutType) -> Self {
        Self {
            id: Uuid::new_v4(),
            workout_type,
            date: Utc::now(),
            entries: Vec::new(),
            completed: false,
        }
    }
}
