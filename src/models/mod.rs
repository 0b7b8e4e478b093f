mod body_weight;
mod exercise;
mod snapshot;
mod workout;

pub use body_weight::BodyWeightEntry;
pub use exercise::{Exercise, ExerciseUpdate, MuscleGroup, SetScheme, WorkoutType};
pub use snapshot::Snapshot;
pub use workout::{Workout, WorkoutEntry};
