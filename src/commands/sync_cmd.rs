use clap::{Args, Subcommand};

use crate::commands::CliApp;

#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub command: SyncSubcommand,
}

#[derive(Subcommand)]
pub enum SyncSubcommand {
    /// Push queued changes and refresh from the remote store
    Now,

    /// Show connectivity and queue status
    Status,
}

impl SyncCommand {
    pub async fn run(&self, app: &CliApp) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SyncSubcommand::Now => {
                if !app.is_reachable() {
                    println!("Remote store is not reachable; nothing synced");
                    return Ok(());
                }
                let pending = app.pending_count();
                app.sync_now().await;
                println!("Synced {} queued change(s), local cache refreshed", pending);
                Ok(())
            }

            SyncSubcommand::Status => {
                println!("Status:  {}", app.state());
                println!("Remote:  {}", if app.is_reachable() { "reachable" } else { "unreachable" });
                println!("Queued:  {} change(s)", app.pending_count());
                Ok(())
            }
        }
    }
}
