use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use liftsync::commands::{
    CliApp, ConfigCommand, ExerciseCommand, SyncCommand, WeightCommand, WorkoutCommand,
};
use liftsync::remote::RestRemote;
use liftsync::sync::{check_server, ManualConnectivity};
use liftsync::Config;

#[derive(Parser)]
#[command(name = "liftsync")]
#[command(version)]
#[command(about = "An offline-first workout tracker", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the exercise catalog
    Exercise(ExerciseCommand),

    /// Start, complete and review workouts
    Workout(WorkoutCommand),

    /// Track body weight
    Weight(WeightCommand),

    /// Sync with the remote store
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),

    /// Reset all data to the starter catalog
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // One reachability probe at startup; commands run against the local
    // snapshot either way. Without auto_sync only the explicit sync and
    // reset commands touch the network.
    let wants_network = config.sync.auto_sync
        || matches!(
            cli.command,
            Some(Commands::Sync(_)) | Some(Commands::Reset { .. })
        );
    let remote = RestRemote::from_config(&config.sync);
    let reachable = match &remote {
        Some(remote) if wants_network => check_server(remote.base_url()).await,
        _ => false,
    };
    let connectivity = ManualConnectivity::new(reachable);
    let remote = remote.unwrap_or_else(|| RestRemote::new("http://localhost", ""));

    let app = CliApp::new(&config.data_dir, remote, connectivity);
    app.load().await;

    match cli.command {
        Some(Commands::Exercise(cmd)) => cmd.run(&app)?,
        Some(Commands::Workout(cmd)) => cmd.run(&app)?,
        Some(Commands::Weight(cmd)) => cmd.run(&app)?,
        Some(Commands::Sync(cmd)) => cmd.run(&app).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        Some(Commands::Reset { force }) => {
            if !force {
                print!("Reset all workout data? [y/N] ");
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Reset cancelled.");
                    return Ok(());
                }
            }
            app.reset_all().await;
            println!("All data reset to the starter catalog");
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
