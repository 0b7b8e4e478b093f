use clap::{Args, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::commands::CliApp;
use crate::models::{Exercise, ExerciseUpdate, MuscleGroup, SetScheme, WorkoutType};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ExerciseCommand {
    #[command(subcommand)]
    pub command: ExerciseSubcommand,
}

#[derive(Subcommand)]
pub enum ExerciseSubcommand {
    /// Add an exercise to the catalog
    Add {
        /// Name of the exercise
        name: String,

        /// Muscle group (e.g. back, chest, rear-delts)
        #[arg(long)]
        muscle_group: MuscleGroup,

        /// Workout category
        #[arg(long = "type")]
        workout_type: WorkoutType,

        /// Set scheme
        #[arg(long, default_value = "4sets")]
        set_scheme: SetScheme,

        /// Starting max weight in kg
        #[arg(long)]
        max_weight: Option<f64>,

        /// Track as a bodyweight exercise (no max weight)
        #[arg(long)]
        bodyweight: bool,

        /// Initial note
        #[arg(long)]
        note: Option<String>,
    },

    /// List exercises
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show one workout category
        #[arg(long = "type")]
        workout_type: Option<WorkoutType>,
    },

    /// Update an existing exercise
    Update {
        /// Exercise ID (UUID) or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New set scheme
        #[arg(long)]
        set_scheme: Option<SetScheme>,

        /// New max weight in kg
        #[arg(long)]
        max_weight: Option<f64>,

        /// Clear the max weight
        #[arg(long, conflicts_with = "max_weight")]
        clear_max_weight: bool,

        /// New note
        #[arg(long)]
        note: Option<String>,

        /// Clear the note
        #[arg(long, conflicts_with = "note")]
        clear_note: bool,

        /// Mark as a bodyweight exercise
        #[arg(long)]
        bodyweight: Option<bool>,
    },

    /// Delete an exercise
    Delete {
        /// Exercise ID (UUID) or name
        identifier: String,
    },
}

impl ExerciseCommand {
    pub fn run(&self, app: &CliApp) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ExerciseSubcommand::Add {
                name,
                muscle_group,
                workout_type,
                set_scheme,
                max_weight,
                bodyweight,
                note,
            } => {
                if name.trim().is_empty() {
                    return Err("Exercise name cannot be empty".into());
                }

                let mut exercise =
                    Exercise::new(name.trim(), *muscle_group, *workout_type, *set_scheme);
                if *bodyweight {
                    exercise = exercise.bodyweight();
                } else if let Some(weight) = max_weight {
                    exercise = exercise.with_max_weight(*weight);
                }
                if let Some(note) = note {
                    exercise = exercise.with_note(note);
                }

                app.add_exercise(exercise.clone());
                println!("Added exercise: {} ({})", exercise.name, exercise.id);
                Ok(())
            }

            ExerciseSubcommand::List {
                format,
                workout_type,
            } => {
                let snapshot = app.snapshot();
                let exercises: Vec<_> = snapshot
                    .exercises
                    .iter()
                    .filter(|ex| workout_type.map_or(true, |t| ex.workout_type == t))
                    .collect();

                if exercises.is_empty() {
                    println!("No exercises found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&exercises)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<36}  {:<28}  {:<10}  {:<6}  MAX",
                            "ID", "NAME", "MUSCLE", "TYPE"
                        );
                        println!("{}", "-".repeat(92));
                        for ex in &exercises {
                            let max = if ex.is_bodyweight {
                                "bw".to_string()
                            } else {
                                ex.max_weight
                                    .map_or_else(|| "-".to_string(), |w| format!("{}", w))
                            };
                            println!(
                                "{:<36}  {:<28}  {:<10}  {:<6}  {}",
                                ex.id,
                                ex.name,
                                ex.muscle_group.to_string(),
                                ex.workout_type.to_string(),
                                max
                            );
                        }
                        println!("\nTotal: {} exercise(s)", exercises.len());
                    }
                }
                Ok(())
            }

            ExerciseSubcommand::Update {
                identifier,
                name,
                set_scheme,
                max_weight,
                clear_max_weight,
                note,
                clear_note,
                bodyweight,
            } => {
                let has_updates = name.is_some()
                    || set_scheme.is_some()
                    || max_weight.is_some()
                    || *clear_max_weight
                    || note.is_some()
                    || *clear_note
                    || bodyweight.is_some();
                if !has_updates {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let exercise = find_exercise(app, identifier)?;

                let updates = ExerciseUpdate {
                    name: name.clone(),
                    set_scheme: *set_scheme,
                    max_weight: if *clear_max_weight {
                        Some(None)
                    } else {
                        max_weight.map(Some)
                    },
                    is_bodyweight: *bodyweight,
                    last_note: if *clear_note {
                        Some(None)
                    } else {
                        note.clone().map(Some)
                    },
                };

                app.update_exercise(exercise.id, updates);
                println!("Updated exercise: {}", exercise.name);
                Ok(())
            }

            ExerciseSubcommand::Delete { identifier } => {
                let exercise = find_exercise(app, identifier)?;
                app.delete_exercise(exercise.id);
                println!("Deleted exercise: {}", exercise.name);
                Ok(())
            }
        }
    }
}

/// UUID first, case-insensitive name as the fallback.
pub fn find_exercise(
    app: &CliApp,
    identifier: &str,
) -> Result<Exercise, Box<dyn std::error::Error>> {
    let snapshot = app.snapshot();
    let found = if let Ok(id) = Uuid::parse_str(identifier) {
        snapshot.exercise_by_id(id).cloned()
    } else {
        snapshot
            .exercises
            .iter()
            .find(|ex| ex.name.eq_ignore_ascii_case(identifier))
            .cloned()
    };
    found.ok_or_else(|| format!("Exercise not found: {}", identifier).into())
}
