mod config_cmd;
mod exercise;
mod sync_cmd;
mod weight;
mod workout;

pub use config_cmd::ConfigCommand;
pub use exercise::ExerciseCommand;
pub use sync_cmd::SyncCommand;
pub use weight::WeightCommand;
pub use workout::{EntrySpec, WorkoutCommand};

use crate::app::App;
use crate::remote::RestRemote;
use crate::sync::ManualConnectivity;

/// The facade as the CLI wires it: a REST remote behind a one-shot
/// reachability probe taken at startup. With no remote configured the
/// probe stays offline and the remote is never touched.
pub type CliApp = App<RestRemote, ManualConnectivity>;
