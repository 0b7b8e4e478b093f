use clap::{Args, Subcommand};
use std::str::FromStr;
use uuid::Uuid;

use crate::commands::exercise::find_exercise;
use crate::commands::CliApp;
use crate::models::{WorkoutEntry, WorkoutType};

/// One `--entry` argument on `workout complete`.
///
/// Format: `EXERCISE:WEIGHT[:NOTE]` where EXERCISE is a UUID or name,
/// WEIGHT is a number in kg, `bw` for a bodyweight set, or `-` for no
/// weight, and NOTE is free text (`clear` drops the stored note).
#[derive(Debug, Clone)]
pub struct EntrySpec {
    pub exercise: String,
    pub weight: Option<f64>,
    pub bodyweight: bool,
    pub note: Option<String>,
    pub clear_note: bool,
}

impl FromStr for EntrySpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let exercise = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| format!("Missing exercise in entry '{}'", s))?
            .to_string();
        let weight_part = parts
            .next()
            .ok_or_else(|| format!("Missing weight in entry '{}' (use a number, 'bw' or '-')", s))?;

        let (weight, bodyweight) = match weight_part {
            "bw" => (None, true),
            "-" => (None, false),
            other => {
                let w: f64 = other
                    .parse()
                    .map_err(|_| format!("Invalid weight '{}' in entry '{}'", other, s))?;
                (Some(w), false)
            }
        };

        let (note, clear_note) = match parts.next() {
            Some("clear") => (None, true),
            Some(text) if !text.is_empty() => (Some(text.to_string()), false),
            _ => (None, false),
        };

        Ok(EntrySpec {
            exercise,
            weight,
            bodyweight,
            note,
            clear_note,
        })
    }
}

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Start a new workout session
    Start {
        /// Workout category
        #[arg(value_name = "TYPE")]
        workout_type: WorkoutType,
    },

    /// Complete a workout and record its entries
    Complete {
        /// Workout ID (UUID); defaults to the most recent incomplete workout
        #[arg(long)]
        id: Option<Uuid>,

        /// Entry as EXERCISE:WEIGHT[:NOTE] (can be repeated)
        #[arg(long = "entry", value_name = "SPEC")]
        entries: Vec<EntrySpec>,
    },

    /// Show the last completed workout of a category
    Last {
        /// Workout category
        #[arg(value_name = "TYPE")]
        workout_type: WorkoutType,
    },

    /// Discard an incomplete workout
    Cancel {
        /// Workout ID (UUID)
        id: Uuid,
    },

    /// Delete a workout from the history
    Delete {
        /// Workout ID (UUID)
        id: Uuid,
    },
}

impl WorkoutCommand {
    pub fn run(&self, app: &CliApp) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WorkoutSubcommand::Start { workout_type } => {
                let (_, workout) = app.start_workout(*workout_type);
                println!("Started {} workout: {}", workout_type, workout.id);
                Ok(())
            }

            WorkoutSubcommand::Complete { id, entries } => {
                let workout_id = match id {
                    Some(id) => *id,
                    None => app
                        .snapshot()
                        .workouts
                        .iter()
                        .rev()
                        .find(|w| !w.completed)
                        .map(|w| w.id)
                        .ok_or("No incomplete workout to complete")?,
                };

                let mut resolved = Vec::with_capacity(entries.len());
                for spec in entries {
                    let exercise = find_exercise(app, &spec.exercise)?;
                    let mut entry = WorkoutEntry::new(exercise.id, spec.weight);
                    if spec.bodyweight {
                        entry = entry.bodyweight();
                    }
                    if spec.clear_note {
                        entry = entry.clearing_note();
                    } else if let Some(note) = &spec.note {
                        entry = entry.with_note(note);
                    }
                    resolved.push(entry);
                }

                let snapshot = app.complete_workout(workout_id, resolved);
                match snapshot.workouts.iter().find(|w| w.id == workout_id) {
                    Some(w) if w.completed => {
                        println!("Completed workout {} with {} entries", w.id, w.entries.len());
                        Ok(())
                    }
                    _ => Err(format!("Workout not found: {}", workout_id).into()),
                }
            }

            WorkoutSubcommand::Last { workout_type } => {
                let snapshot = app.snapshot();
                match snapshot.last_workout(*workout_type) {
                    Some(workout) => {
                        println!("Last {} workout: {}", workout_type, workout.id);
                        println!("Date: {}", workout.date.format("%Y-%m-%d %H:%M"));
                        for entry in &workout.entries {
                            let name = snapshot
                                .exercise_by_id(entry.exercise_id)
                                .map_or("(deleted)", |ex| ex.name.as_str());
                            let weight = if entry.is_bodyweight.unwrap_or(false) {
                                "bw".to_string()
                            } else {
                                entry
                                    .weight
                                    .map_or_else(|| "-".to_string(), |w| format!("{} kg", w))
                            };
                            match &entry.note {
                                Some(note) => println!("  {:<28}  {:<8}  {}", name, weight, note),
                                None => println!("  {:<28}  {}", name, weight),
                            }
                        }
                        Ok(())
                    }
                    None => {
                        println!("No completed {} workout yet", workout_type);
                        Ok(())
                    }
                }
            }

            WorkoutSubcommand::Cancel { id } => {
                let had_it = app.snapshot().workouts.iter().any(|w| w.id == *id);
                if !had_it {
                    return Err(format!("Workout not found: {}", id).into());
                }
                app.cancel_workout(*id);
                println!("Cancelled workout {}", id);
                Ok(())
            }

            WorkoutSubcommand::Delete { id } => {
                let had_it = app.snapshot().workouts.iter().any(|w| w.id == *id);
                if !had_it {
                    return Err(format!("Workout not found: {}", id).into());
                }
                app.delete_workout(*id);
                println!("Deleted workout {}", id);
                Ok(())
            }
        }
    }
}
