//! CLI argument definitions using clap
//!
//! Commands:
//! - billvault init --config <path>
//! - billvault serve --config <path> [--port <port>]
//! - billvault archive --config <path>
//! - billvault get <id> --config <path>
//! - billvault restore <id> --config <path>
//! - billvault stats --config <path>
//! - billvault reconcile --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Billvault - tiered billing-record storage with cold-tier archival
#[derive(Parser, Debug)]
#[command(name = "billvault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory layout
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./billvault.json")]
        config: PathBuf,
    },

    /// Serve the HTTP API and run scheduled archival
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./billvault.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one archival pass and print its outcome
    Archive {
        /// Path to configuration file
        #[arg(long, default_value = "./billvault.json")]
        config: PathBuf,
    },

    /// Look a record up across all tiers
    Get {
        /// Record id
        id: String,

        /// Path to configuration file
        #[arg(long, default_value = "./billvault.json")]
        config: PathBuf,
    },

    /// Move an archived record back into the hot tier
    Restore {
        /// Record id
        id: String,

        /// Path to configuration file
        #[arg(long, default_value = "./billvault.json")]
        config: PathBuf,
    },

    /// Print record counts per tier
    Stats {
        /// Path to configuration file
        #[arg(long, default_value = "./billvault.json")]
        config: PathBuf,
    },

    /// Remove leftovers of interrupted migrations
    Reconcile {
        /// Path to configuration file
        #[arg(long, default_value = "./billvault.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from(["billvault", "get", "inv-1", "--config", "/etc/bv.json"]).unwrap();
        match cli.command {
            Command::Get { id, config } => {
                assert_eq!(id, "inv-1");
                assert_eq!(config, PathBuf::from("/etc/bv.json"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["billvault", "serve"]).unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("./billvault.json"));
                assert!(port.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
