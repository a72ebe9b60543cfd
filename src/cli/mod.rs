//! CLI module for Billvault
//!
//! Provides command-line interface for:
//! - init: Create the data directory layout
//! - serve: HTTP API plus scheduled archival
//! - archive, get, restore, stats, reconcile: one-shot engine operations

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{archive, get, init, reconcile, restore, run, run_command, serve, stats};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
