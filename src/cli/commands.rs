//! CLI command implementations
//!
//! Every command loads and validates configuration first. Only `init`
//! creates directories; the rest require an initialized data directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::archive_index::{CollectionArchiveIndex, INDEX_NAMESPACE};
use crate::cold_storage::LocalColdStore;
use crate::config::ServiceConfig;
use crate::http_server::HttpServer;
use crate::observability::{Event, Logger};
use crate::primary::{CollectionPrimaryStore, RECORDS_NAMESPACE};
use crate::tiering::{ArchiveScheduler, StatsReport, TieringEngine};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Archive { config } => archive(&config),
        Command::Get { id, config } => get(&config, &id),
        Command::Restore { id, config } => restore(&config, &id),
        Command::Stats { config } => stats(&config),
        Command::Reconcile { config } => reconcile(&config),
    }
}

fn load_config(config_path: &Path) -> CliResult<ServiceConfig> {
    match ServiceConfig::load(config_path) {
        Ok(config) => {
            // validate() already checked the level
            if let Ok(severity) = config.log_severity() {
                Logger::set_min_severity(severity);
            }
            let path = config_path.display().to_string();
            Logger::emit(
                Event::ConfigLoaded,
                &[("path", path.as_str()), ("data_dir", config.data_dir.as_str())],
            );
            Ok(config)
        }
        Err(e) => {
            let reason = e.to_string();
            Logger::emit(Event::ConfigInvalid, &[("reason", reason.as_str())]);
            Err(e.into())
        }
    }
}

fn is_initialized(config: &ServiceConfig) -> bool {
    config.hot_dir().join(RECORDS_NAMESPACE).is_dir()
        && config.hot_dir().join(INDEX_NAMESPACE).is_dir()
        && config.cold_dir().is_dir()
}

/// Build the engine over the directory-backed stores
fn open_engine(config: &ServiceConfig) -> CliResult<TieringEngine> {
    if !is_initialized(config) {
        return Err(CliError::not_initialized());
    }
    let hot_dir = config.hot_dir();
    let primary = CollectionPrimaryStore::open(&hot_dir)?;
    let index = CollectionArchiveIndex::open(&hot_dir)?;
    let cold = LocalColdStore::open(config.cold_dir())?;

    Ok(TieringEngine::new(
        Arc::new(primary),
        Arc::new(cold),
        Arc::new(index),
        config.tiering(),
    )?)
}

/// Create the data directory layout
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    if is_initialized(&config) {
        return Err(CliError::already_initialized());
    }

    let dirs = [
        config.hot_dir().join(RECORDS_NAMESPACE),
        config.hot_dir().join(INDEX_NAMESPACE),
        config.cold_dir(),
    ];
    for dir in &dirs {
        fs::create_dir_all(dir).map_err(|e| {
            CliError::config_error(format!("Failed to create directory {:?}: {}", dir, e))
        })?;
    }

    write_response(&json!({"initialized": true, "data_dir": config.data_dir}))
}

/// Serve HTTP and, when configured, scheduled archival until Ctrl-C
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    Logger::emit(Event::BootStart, &[]);
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }
    let schedule = config.schedule()?;
    let engine = Arc::new(open_engine(&config)?);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let scheduler = schedule.map(|schedule| ArchiveScheduler::spawn(Arc::clone(&engine), schedule));

        let server = HttpServer::new(config.http.clone(), Arc::clone(&engine));
        let served = server
            .start_with_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;

        if let Some(scheduler) = scheduler {
            scheduler.shutdown().await;
        }
        served.map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Logger::emit(Event::ShutdownComplete, &[]);
    Ok(())
}

/// Run one archival pass
pub fn archive(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let engine = open_engine(&config)?;

    let outcome = engine.archive_old_records();
    if !outcome.success {
        return Err(CliError::operation_failed(outcome.message));
    }
    write_response(&outcome)
}

pub fn get(config_path: &Path, id: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let engine = open_engine(&config)?;

    let resolved = engine.resolve_record(id)?;
    write_response(&json!({
        "source": resolved.source,
        "record": resolved.record,
    }))
}

pub fn restore(config_path: &Path, id: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let engine = open_engine(&config)?;

    if !engine.restore_record(id) {
        return Err(CliError::operation_failed(format!(
            "Record {} not found in archive or restore failed",
            id
        )));
    }
    write_response(&json!({"restored": true, "id": id}))
}

pub fn stats(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let engine = open_engine(&config)?;

    match engine.get_stats() {
        StatsReport::Snapshot(snapshot) => write_response(&snapshot),
        StatsReport::Error { error } => Err(CliError::operation_failed(error)),
    }
}

pub fn reconcile(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let engine = open_engine(&config)?;

    let outcome = engine.reconcile()?;
    write_response(&outcome)
}
