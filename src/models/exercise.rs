use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::workout::WorkoutEntry;

/// Which of the two session categories an exercise belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Pull,
    Push,
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutType::Pull => write!(f, "pull"),
            WorkoutType::Push => write!(f, "push"),
        }
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pull" => Ok(WorkoutType::Pull),
            "push" => Ok(WorkoutType::Push),
            _ => Err(format!(
                "Invalid workout type '{}'. Valid options: pull, push",
                s
            )),
        }
    }
}

/// Muscle group tag used to organize the exercise catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MuscleGroup {
    Back,
    Biceps,
    RearDelts,
    Shrugs,
    Chest,
    Shoulders,
    Triceps,
    Legs,
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MuscleGroup::Back => "back",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::RearDelts => "rear-delts",
            MuscleGroup::Shrugs => "shrugs",
            MuscleGroup::Chest => "chest",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Legs => "legs",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MuscleGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "back" => Ok(MuscleGroup::Back),
            "biceps" => Ok(MuscleGroup::Biceps),
            "rear-delts" => Ok(MuscleGroup::RearDelts),
            "shrugs" => Ok(MuscleGroup::Shrugs),
            "chest" => Ok(MuscleGroup::Chest),
            "shoulders" => Ok(MuscleGroup::Shoulders),
            "triceps" => Ok(MuscleGroup::Triceps),
            "legs" => Ok(MuscleGroup::Legs),
            _ => Err(format!(
                "Invalid muscle group '{}'. Valid options: back, biceps, rear-delts, \
                 shrugs, chest, shoulders, triceps, legs",
                s
            )),
        }
    }
}

/// Rep/set scheme tag. The serialized names double as display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetScheme {
    #[serde(rename = "4sets")]
    FourSets,
    #[serde(rename = "3sets")]
    ThreeSets,
    #[serde(rename = "3x5")]
    ThreeByFive,
}

impl fmt::Display for SetScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetScheme::FourSets => write!(f, "4sets"),
            SetScheme::ThreeSets => write!(f, "3sets"),
            SetScheme::ThreeByFive => write!(f, "3x5"),
        }
    }
}

impl FromStr for SetScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "4sets" => Ok(SetScheme::FourSets),
            "3sets" => Ok(SetScheme::ThreeSets),
            "3x5" => Ok(SetScheme::ThreeByFive),
            _ => Err(format!(
                "Invalid set scheme '{}'. Valid options: 4sets, 3sets, 3x5",
                s
            )),
        }
    }
}

/// A catalog exercise with its best recorded load and last session note.
///
/// Invariant: a bodyweight exercise never carries a max weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
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

impl Exercise {
    pub fn new(
        name: impl Into<String>,
        muscle_group: MuscleGroup,
        workout_type: WorkoutType,
        set_scheme: SetScheme,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            muscle_group,
            workout_type,
            set_scheme,
            max_weight: None,
            is_bodyweight: false,
            last_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_max_weight(mut self, max_weight: f64) -> Self {
        self.max_weight = Some(max_weight);
        self
    }

    /// Marks the exercise as bodyweight, which clears any recorded max weight.
    pub fn bodyweight(mut self) -> Self {
        self.is_bodyweight = true;
        self.max_weight = None;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.last_note = Some(note.into());
        self
    }

    /// Applies a partial update in place and refreshes the update timestamp.
    pub fn apply_update(&mut self, updates: &ExerciseUpdate, now: DateTime<Utc>) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(scheme) = updates.set_scheme {
            self.set_scheme = scheme;
        }
        if let Some(max_weight) = updates.max_weight {
            self.max_weight = max_weight;
        }
        if let Some(is_bodyweight) = updates.is_bodyweight {
            self.is_bodyweight = is_bodyweight;
        }
        if let Some(last_note) = &updates.last_note {
            self.last_note = last_note.clone();
        }
        if self.is_bodyweight {
            self.max_weight = None;
        }
        self.updated_at = now;
    }

    /// Folds a completed workout entry into the exercise's derived fields.
    ///
    /// The max weight only rises when the entry carried a load, was not done
    /// as bodyweight, and beats the previous best. A bodyweight entry clears
    /// the max outright. A `clear_note` directive wins over any carried note;
    /// an empty-string note is not a note.
    pub fn record_entry(&mut self, entry: &WorkoutEntry, now: DateTime<Utc>) {
        let is_bodyweight = entry.is_bodyweight.unwrap_or(false);
        let raises_max = !is_bodyweight
            && entry
                .weight
                .map(|w| self.max_weight.map_or(true, |max| w > max))
                .unwrap_or(false);

        if raises_max {
            self.max_weight = entry.weight;
        } else if is_bodyweight {
            self.max_weight = None;
        }

        if let Some(bw) = entry.is_bodyweight {
            self.is_bodyweight = bw;
        }

        if entry.clear_note {
            self.last_note = None;
        } else if let Some(note) = entry.note.as_deref().filter(|n| !n.is_empty()) {
            self.last_note = Some(note.to_string());
        }

        self.updated_at = now;
    }
}

/// Partial update for an exercise. Absent fields are left untouched;
/// `max_weight` and `last_note` distinguish "absent" from "set to null".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_scheme: Option<SetScheme>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub max_weight: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bodyweight: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub last_note: Option<Option<String>>,
}

/// Serde helper so `Some(None)` roundtrips as an explicit JSON null
/// while `None` is omitted entirely.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press() -> Exercise {
        Exercise::new(
            "Flat Barbell Press",
            MuscleGroup::Chest,
            WorkoutType::Push,
            SetScheme::FourSets,
        )
        .with_max_weight(90.0)
    }

    fn entry(weight: Option<f64>) -> WorkoutEntry {
        WorkoutEntry {
            exercise_id: Uuid::new_v4(),
            weight,
            is_bodyweight: None,
            note: None,
            clear_note: false,
        }
    }

    #[test]
    fn test_bodyweight_builder_clears_max() {
        let ex = press().bodyweight();
        assert!(ex.is_bodyweight);
        assert_eq!(ex.max_weight, None);
    }

    #[test]
    fn test_record_entry_raises_max() {
        let mut ex = press();
        ex.record_entry(&entry(Some(100.0)), Utc::now());
        assert_eq!(ex.max_weight, Some(100.0));
    }

    #[test]
    fn test_record_entry_keeps_higher_max() {
        let mut ex = press();
        ex.record_entry(&entry(Some(80.0)), Utc::now());
        assert_eq!(ex.max_weight, Some(90.0));
    }

    #[test]
    fn test_record_entry_first_load_sets_max() {
        let mut ex = Exercise::new(
            "Hammer Curl",
            MuscleGroup::Biceps,
            WorkoutType::Pull,
            SetScheme::FourSets,
        );
        ex.record_entry(&entry(Some(12.0)), Utc::now());
        assert_eq!(ex.max_weight, Some(12.0));
    }

    #[test]
    fn test_record_entry_bodyweight_nulls_max() {
        let mut ex = press();
        let mut e = entry(Some(120.0));
        e.is_bodyweight = Some(true);
        ex.record_entry(&e, Utc::now());
        assert_eq!(ex.max_weight, None);
        assert!(ex.is_bodyweight);
    }

    #[test]
    fn test_record_entry_clear_note_beats_empty_note() {
        let mut ex = press().with_note("old note");
        let mut e = entry(None);
        e.note = Some(String::new());
        e.clear_note = true;
        ex.record_entry(&e, Utc::now());
        assert_eq!(ex.last_note, None);
    }

    #[test]
    fn test_record_entry_empty_note_keeps_previous() {
        let mut ex = press().with_note("old note");
        let mut e = entry(None);
        e.note = Some(String::new());
        ex.record_entry(&e, Utc::now());
        assert_eq!(ex.last_note, Some("old note".to_string()));
    }

    #[test]
    fn test_record_entry_overwrites_note() {
        let mut ex = press().with_note("old note");
        let mut e = entry(Some(50.0));
        e.note = Some("felt strong".to_string());
        ex.record_entry(&e, Utc::now());
        assert_eq!(ex.last_note, Some("felt strong".to_string()));
    }

    #[test]
    fn test_apply_update_partial() {
        let mut ex = press();
        let before_name = ex.name.clone();
        ex.apply_update(
            &ExerciseUpdate {
                max_weight: Some(Some(95.0)),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(ex.max_weight, Some(95.0));
        assert_eq!(ex.name, before_name);
    }

    #[test]
    fn test_apply_update_bodyweight_enforces_invariant() {
        let mut ex = press();
        ex.apply_update(
            &ExerciseUpdate {
                is_bodyweight: Some(true),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(ex.is_bodyweight);
        assert_eq!(ex.max_weight, None);
    }

    #[test]
    fn test_update_json_roundtrip_preserves_explicit_null() {
        let update = ExerciseUpdate {
            max_weight: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"maxWeight\":null"));

        let parsed: ExerciseUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.max_weight, Some(None));
        assert_eq!(parsed.last_note, None);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&MuscleGroup::RearDelts).unwrap(),
            "\"rear-delts\""
        );
        assert_eq!(
            serde_json::to_string(&SetScheme::FourSets).unwrap(),
            "\"4sets\""
        );
        assert_eq!(
            serde_json::to_string(&WorkoutType::Pull).unwrap(),
            "\"pull\""
        );
    }

    #[test]
    fn test_exercise_json_uses_camel_case() {
        let ex = press();
        let json = serde_json::to_string(&ex).unwrap();
        assert!(json.contains("\"muscleGroup\""));
        assert!(json.contains("\"maxWeight\""));
        assert!(json.contains("\"isBodyweight\""));
    }

    #[test]
    fn test_from_str_invalid() {
        assert!(WorkoutType::from_str("legs").is_err());
        assert!(MuscleGroup::from_str("arms").is_err());
        assert!(SetScheme::from_str("5x5").is_err());
    }
}
