//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// cityrank - City donation leaderboard service
#[derive(Parser)]
#[command(name = "cityrank")]
#[command(version)]
#[command(about = "City donation leaderboard service", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = crate::config::AppConfig::DEFAULT_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Record one completed donation
    Record {
        /// City name
        city: String,

        /// Donation amount (> 0)
        amount: f64,

        /// Donor identifier
        donor: String,
    },

    /// Show the top cities
    Top {
        /// Number of cities (default: ranking.top_limit)
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show a city's rank and its neighbours
    Context {
        city: String,

        /// Rank radius (default: ranking.context_radius)
        #[arg(long, short = 'r')]
        radius: Option<u32>,
    },

    /// Show statistics for one city, or global statistics when omitted
    Stats {
        city: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute every rank from the stored aggregates
    Rebuild,

    /// Record random demo donations across the sample cities
    Seed {
        /// Number of donations to record
        #[arg(long, default_value_t = 200)]
        donations: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["cityrank"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_record_command() {
        let cli = Cli::try_parse_from(["cityrank", "-c", "prod.toml", "record", "Austin", "25.5", "d1"])
            .unwrap();
        assert_eq!(cli.config, "prod.toml");
        assert_eq!(
            cli.command,
            Some(Commands::Record {
                city: "Austin".into(),
                amount: 25.5,
                donor: "d1".into()
            })
        );
    }

    #[test]
    fn test_context_radius_flag() {
        let cli = Cli::try_parse_from(["cityrank", "context", "Boston", "--radius", "5"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Context {
                city: "Boston".into(),
                radius: Some(5)
            })
        );
    }

    #[test]
    fn test_record_rejects_non_numeric_amount() {
        assert!(Cli::try_parse_from(["cityrank", "record", "Austin", "lots", "d1"]).is_err());
    }
}
