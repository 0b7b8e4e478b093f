use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::commands::CliApp;

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Record a body weight measurement
    Add {
        /// Weight in kg
        weight: f64,

        /// Measurement time (RFC 3339); defaults to now
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },

    /// Show the most recent measurement
    Latest,

    /// List all measurements
    List,

    /// Delete a measurement
    Delete {
        /// Entry ID (UUID)
        id: Uuid,
    },
}

impl WeightCommand {
    pub fn run(&self, app: &CliApp) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WeightSubcommand::Add { weight, date } => {
                if *weight <= 0.0 {
                    return Err("Weight must be a positive number".into());
                }
                app.add_body_weight(*weight, *date);
                println!("Recorded body weight: {} kg", weight);
                Ok(())
            }

            WeightSubcommand::Latest => {
                match app.latest_body_weight() {
                    Some(entry) => println!(
                        "{} kg on {}",
                        entry.weight,
                        entry.date.format("%Y-%m-%d %H:%M")
                    ),
                    None => println!("No body weight recorded yet"),
                }
                Ok(())
            }

            WeightSubcommand::List => {
                let mut history = app.snapshot().body_weight_history;
                if history.is_empty() {
                    println!("No body weight recorded yet");
                    return Ok(());
                }
                history.sort_by_key(|e| e.date);

                println!("{:<36}  {:<18}  WEIGHT", "ID", "DATE");
                println!("{}", "-".repeat(64));
                for entry in &history {
                    println!(
                        "{:<36}  {:<18}  {} kg",
                        entry.id,
                        entry.date.format("%Y-%m-%d %H:%M"),
                        entry.weight
                    );
                }
                Ok(())
            }

            WeightSubcommand::Delete { id } => {
                let had_it = app
                    .snapshot()
                    .body_weight_history
                    .iter()
                    .any(|e| e.id == *id);
                if !had_it {
                    return Err(format!("Body weight entry not found: {}", id).into());
                }
                app.delete_body_weight(*id);
                println!("Deleted body weight entry {}", id);
                Ok(())
            }
        }
    }
}
