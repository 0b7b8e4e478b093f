use clap::{Args, Subcommand, ValueEnum};

use crate::config::{default_config_path, Config};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the config file path
    Path,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        println!("data_dir: {}", config.data_dir.display());
                        println!();

                        match &config.sync.server_url {
                            Some(url) => println!("sync.server_url: {}", url),
                            None => println!("sync.server_url: (not set)"),
                        }
                        println!(
                            "sync.api_key: {}",
                            if config.sync.api_key.is_some() {
                                "(set)"
                            } else {
                                "(not set)"
                            }
                        );
                        println!("sync.auto_sync: {}", config.sync.auto_sync);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Path => {
                match default_config_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("(no config directory available)"),
                }
                Ok(())
            }
        }
    }
}
