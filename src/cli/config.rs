//! Configuration management CLI commands.

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use clap::{Args, Subcommand};
use tracing::info;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Write the default configuration file
    Init(ConfigInitArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Write the default configuration file
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    force: bool,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Init(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            let json = serde_json::to_string_pretty(&config).map_err(|e| {
                CliError::io(format!("Failed to serialize configuration to JSON: {}", e))
            })?;
            println!("{}", json);
        } else {
            output_human_readable(&config)?;
        }

        Ok(())
    }
}

impl ConfigInitArgs {
    /// Execute init command
    pub fn execute(&self) -> CliResult<()> {
        let path = Config::config_file_path()
            .map_err(|e| CliError::io(format!("Failed to resolve config path: {e:#}")))?;

        if path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "Configuration already exists at {} (use --force to overwrite)",
                path.display()
            )));
        }

        Config::new()
            .save_to(&path)
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        info!("Wrote default configuration to {}", path.display());
        println!("Configuration written to {}", path.display());
        Ok(())
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) -> CliResult<()> {
    let location = Config::config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "(unavailable)".to_string());
    let source = if Config::exists() { "" } else { " (defaults)" };

    println!("Bistro UI Configuration");
    println!("=======================");
    println!("File: {}{}", location, source);
    println!();

    let toml = toml::to_string_pretty(config)
        .map_err(|e| CliError::io(format!("Failed to serialize configuration: {}", e)))?;
    println!("{}", toml.trim_end());
    Ok(())
}
