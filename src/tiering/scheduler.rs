//! # Scheduled Archival
//!
//! Runs archival on a cron schedule in a tokio task. The run itself is
//! blocking store I/O and goes through `spawn_blocking`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use croner::Cron;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::cancel::CancelSignal;
use super::engine::TieringEngine;
use super::errors::{TieringError, TieringResult};
use crate::observability::{Event, Logger};

/// Parsed cron expression
pub struct ArchiveSchedule {
    expression: String,
    cron: Cron,
}

impl fmt::Debug for ArchiveSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveSchedule")
            .field("expression", &self.expression)
            .finish()
    }
}

impl ArchiveSchedule {
    pub fn parse(expression: &str) -> TieringResult<Self> {
        let cron = Cron::new(expression).parse().map_err(|e| {
            TieringError::Configuration(format!("invalid archive schedule '{}': {}", expression, e))
        })?;
        Ok(Self {
            expression: expression.to_string(),
            cron,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First occurrence strictly after `after`
    pub fn next_after(&self, after: DateTime<Utc>) -> TieringResult<DateTime<Utc>> {
        self.cron.find_next_occurrence(&after, false).map_err(|e| {
            TieringError::Configuration(format!(
                "schedule '{}' has no next occurrence: {}",
                self.expression, e
            ))
        })
    }
}

/// Handle to a running schedule
#[derive(Debug)]
pub struct ArchiveScheduler {
    shutdown: watch::Sender<bool>,
    cancel: CancelSignal,
    handle: JoinHandle<()>,
}

impl ArchiveScheduler {
    /// Start the schedule loop on the current tokio runtime
    pub fn spawn(engine: Arc<TieringEngine>, schedule: ArchiveSchedule) -> Self {
        let (shutdown, receiver) = watch::channel(false);
        let cancel = CancelSignal::new();
        let handle = tokio::spawn(run_schedule(engine, schedule, receiver, cancel.clone()));
        Self {
            shutdown,
            cancel,
            handle,
        }
    }

    /// Stop the loop and cancel an in-flight run between records
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

async fn run_schedule(
    engine: Arc<TieringEngine>,
    schedule: ArchiveSchedule,
    mut shutdown: watch::Receiver<bool>,
    cancel: CancelSignal,
) {
    loop {
        let now = Utc::now();
        let next = match schedule.next_after(now) {
            Ok(next) => next,
            Err(e) => {
                let reason = e.to_string();
                Logger::emit(Event::ScheduleRunFailed, &[("reason", reason.as_str())]);
                return;
            }
        };
        let next_str = next.to_rfc3339();
        Logger::emit(
            Event::ScheduleNextRun,
            &[("schedule", schedule.expression()), ("next_run", next_str.as_str())],
        );

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
                continue;
            }
        }

        let run_engine = Arc::clone(&engine);
        let run_cancel = cancel.clone();
        match tokio::task::spawn_blocking(move || run_engine.archive_old_records_with(&run_cancel)).await {
            Ok(outcome) if outcome.success => {}
            Ok(outcome) => {
                Logger::emit(Event::ScheduleRunFailed, &[("reason", outcome.message.as_str())]);
            }
            Err(e) => {
                let reason = e.to_string();
                Logger::emit(Event::ScheduleRunFailed, &[("reason", reason.as_str())]);
            }
        }
    }
}
