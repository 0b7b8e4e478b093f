use chrono::Duration;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::body_weight::BodyWeightEntry;
use super::exercise::{Exercise, MuscleGroup, SetScheme, WorkoutType};
use super::workout::Workout;

/// The complete local replica of the user's data.
///
/// Owned by the local durable store: replaced wholesale on load/reset and
/// mutated field by field by each domain operation. Serialized as camelCase
/// JSON; older snapshots without a body-weight history still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub exercises: Vec<Exercise>,
    pub workouts: Vec<Workout>,
    pub last_pull_workout_id: Option<Uuid>,
    pub last_push_workout_id: Option<Uuid>,
    #[serde(default)]
    pub body_weight_history: Vec<BodyWeightEntry>,
}

impl Snapshot {
    /// Builds the default-seeded snapshot: a starter exercise catalog and a
    /// short body-weight history, no workouts.
    pub fn seeded() -> Self {
        Self {
            exercises: default_catalog(),
            workouts: Vec::new(),
            last_pull_workout_id: None,
            last_push_workout_id: None,
            body_weight_history: default_body_weight_history(),
        }
    }

    pub fn exercise_by_id(&self, id: Uuid) -> Option<&Exercise> {
        self.exercises.iter().find(|ex| ex.id == id)
    }

    /// The workout the category pointer refers to, if any.
    pub fn last_workout(&self, workout_type: WorkoutType) -> Option<&Workout> {
        let id = match workout_type {
            WorkoutType::Pull => self.last_pull_workout_id,
            WorkoutType::Push => self.last_push_workout_id,
        }?;
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Entry with the maximum timestamp, not the last one inserted.
    pub fn latest_body_weight(&self) -> Option<&BodyWeightEntry> {
        self.body_weight_history.iter().max_by_key(|e| e.date)
    }
}

fn default_catalog() -> Vec<Exercise> {
    use MuscleGroup::*;
    use SetScheme::*;
    use WorkoutType::*;

    vec![
        Exercise::new("Incline Dumbbell Press", Chest, Push, FourSets).with_max_weight(25.0),
        Exercise::new("Flat Barbell Press", Chest, Push, FourSets)
            .with_max_weight(25.0)
            .with_note("medium"),
        Exercise::new("Pushups", Chest, Push, ThreeSets).bodyweight(),
        Exercise::new("Shoulder Machine Press", Shoulders, Push, FourSets).with_max_weight(25.0),
        Exercise::new("Rope Pushdown", Triceps, Push, ThreeSets)
            .with_max_weight(6.0)
            .with_note("plates"),
        Exercise::new("Leg Extension", Legs, Push, FourSets)
            .with_max_weight(7.0)
            .with_note("plates"),
        Exercise::new("Pull Ups", Back, Pull, ThreeByFive)
            .bodyweight()
            .with_note("2 self, 3 assisted"),
        Exercise::new("Lat Pulldown", Back, Pull, FourSets)
            .with_max_weight(12.0)
            .with_note("plates"),
        Exercise::new("Rack Pull", Back, Pull, FourSets)
            .with_max_weight(130.0)
            .with_note("5 clean"),
        Exercise::new("Biceps Curls Barbell", Biceps, Pull, FourSets).with_max_weight(7.5),
        Exercise::new("Rear Delt Fly Dumbbell", RearDelts, Pull, ThreeSets).with_max_weight(4.0),
        Exercise::new("Dumbbell Shrugs", Shrugs, Pull, FourSets).with_max_weight(30.0),
        Exercise::new("Leg Curls", Legs, Pull, FourSets)
            .with_max_weight(7.0)
            .with_note("4 clean, plates"),
    ]
}

fn default_body_weight_history() -> Vec<BodyWeightEntry> {
    let now = Utc::now();
    vec![
        BodyWeightEntry::new(93.8, now - Duration::days(92)),
        BodyWeightEntry::new(96.6, now - Duration::days(39)),
        BodyWeightEntry::new(97.2, now - Duration::days(21)),
        BodyWeightEntry::new(97.3, now - Duration::days(1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_snapshot_has_catalog_and_history() {
        let snapshot = Snapshot::seeded();
        assert!(!snapshot.exercises.is_empty());
        assert!(snapshot.workouts.is_empty());
        assert!(!snapshot.body_weight_history.is_empty());
        assert_eq!(snapshot.last_pull_workout_id, None);
        assert_eq!(snapshot.last_push_workout_id, None);
    }

    #[test]
    fn test_seeded_bodyweight_exercises_have_no_max() {
        for ex in Snapshot::seeded().exercises {
            if ex.is_bodyweight {
                assert_eq!(ex.max_weight, None, "{} violates the invariant", ex.name);
            }
        }
    }

    #[test]
    fn test_latest_body_weight_is_max_by_date() {
        let mut snapshot = Snapshot::seeded();
        snapshot.body_weight_history.clear();
        let now = Utc::now();
        // Inserted out of order on purpose
        snapshot
            .body_weight_history
            .push(BodyWeightEntry::new(81.0, now));
        snapshot
            .body_weight_history
            .push(BodyWeightEntry::new(80.0, now - Duration::days(1)));

        let latest = snapshot.latest_body_weight().unwrap();
        assert_eq!(latest.weight, 81.0);
    }

    #[test]
    fn test_missing_body_weight_history_defaults_empty() {
        let json = r#"{
            "exercises": [],
            "workouts": [],
            "lastPullWorkoutId": null,
            "lastPushWorkoutId": null
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.body_weight_history.is_empty());
    }

    #[test]
    fn test_last_workout_follows_pointer() {
        let mut snapshot = Snapshot::seeded();
        let workout = Workout::new(WorkoutType::Pull);
        let id = workout.id;
        snapshot.workouts.push(workout);
        assert!(snapshot.last_workout(WorkoutType::Pull).is_none());

        snapshot.last_pull_workout_id = Some(id);
        assert_eq!(snapshot.last_workout(WorkoutType::Pull).unwrap().id, id);
        assert!(snapshot.last_workout(WorkoutType::Push).is_none());
    }
}
