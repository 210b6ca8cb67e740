//! CLI interface module
//!
//! One-shot commands run against the configured storage backend.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::get_config;
use crate::runtime::lifetime::startup::prepare_engine;
use commands::{
    config_generate, rebuild_ranking, record_donation, seed_demo_data, show_city_context,
    show_global_statistics, show_city_statistics, show_top_cities,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    InvalidInput(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::InvalidInput(msg) => format!("Invalid input: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::InvalidInput(msg) => {
                format!("{} {}", "Invalid input:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::RankingError> for CliError {
    fn from(err: crate::errors::RankingError) -> Self {
        use crate::errors::RankingError;
        match err {
            RankingError::InvalidInput(msg) => CliError::InvalidInput(msg),
            RankingError::StorageFailure(_)
            | RankingError::DatabaseConfig(_)
            | RankingError::DatabaseConnection(_)
            | RankingError::Committed(_) => CliError::StorageError(err.to_string()),
            other => CliError::CommandError(other.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // Generate doesn't need storage
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_generate(output_path, force);
    }

    let config = get_config();
    let engine = prepare_engine(&config).await?;

    match cmd {
        Commands::Record {
            city,
            amount,
            donor,
        } => record_donation(&engine, &city, amount, &donor).await,
        Commands::Top { limit } => {
            show_top_cities(&engine, limit.unwrap_or(config.ranking.top_limit)).await
        }
        Commands::Context { city, radius } => {
            show_city_context(
                &engine,
                &city,
                radius.unwrap_or(config.ranking.context_radius),
            )
            .await
        }
        Commands::Stats {
            city: Some(city),
            json,
        } => show_city_statistics(&engine, &city, json).await,
        Commands::Stats { city: None, json } => show_global_statistics(&engine, json).await,
        Commands::Rebuild => rebuild_ranking(&engine).await,
        Commands::Seed { donations } => seed_demo_data(&engine, donations).await,
        Commands::Serve | Commands::Config { .. } => Err(CliError::CommandError(
            "command is not handled in CLI mode".to_string(),
        )),
    }
}
