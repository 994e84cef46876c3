use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use trafgen_http::HttpClient;

use crate::catalog::{CatalogData, PayloadCatalog};
use crate::classify::TrafficClassifier;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::executor::RequestExecutor;
use crate::logs::{LogRouter, LogStream};

use super::progress::{ProgressFn, ProgressUpdate};
use super::rate::RateController;
use super::signal::StopSignal;
use super::stats::{Statistics, StatsSnapshot};
use super::worker::{WorkerContext, WorkerExit, run_worker};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: String,
    pub state: SessionState,
    pub stats: StatsSnapshot,
    pub log_directory: PathBuf,
}

/// Owns one simulation run from validation to the final statistics record.
pub struct SessionManager {
    state: Arc<Mutex<SessionState>>,
    catalog: Arc<PayloadCatalog>,
    client: HttpClient,
    progress: Option<ProgressFn>,
}

impl SessionManager {
    pub fn new(catalog: CatalogData) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::Idle)),
            catalog: Arc::new(PayloadCatalog::new(catalog)),
            client: HttpClient::default(),
            progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    pub fn state(&self) -> SessionState {
        *lock_state(&self.state)
    }

    /// Validate `config`, open the log streams and spawn the workers.
    ///
    /// Only an idle manager can start; a failed start leaves it idle.
    pub async fn start(&self, config: RunConfig) -> Result<SessionHandle> {
        let mut state = lock_state(&self.state);
        if *state != SessionState::Idle {
            return Err(Error::InvalidState(*state));
        }

        config.validate()?;
        let policy = config.class_policy();
        self.catalog.validate(&policy)?;

        let session_id = new_session_id();
        let logs = Arc::new(LogRouter::open(&config.log_directory, &session_id)?);

        let config = Arc::new(config);
        let stats = Arc::new(Statistics::new());
        let stop = Arc::new(StopSignal::new());
        let rate = Arc::new(RateController::new(config.target_rpm, config.max_workers));
        let classifier = Arc::new(TrafficClassifier::new(policy));
        let executor = Arc::new(RequestExecutor::with_client(
            self.client.clone(),
            config.retry,
        ));

        let started = Instant::now();
        let deadline = started + config.duration;
        rate.start_at(started);

        tracing::info!(
            session_id = %session_id,
            duration = ?config.duration,
            target_rpm = config.target_rpm,
            max_workers = config.max_workers,
            log_directory = %config.log_directory.display(),
            "session started"
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..config.max_workers {
            workers.spawn(run_worker(WorkerContext {
                worker_id,
                config: Arc::clone(&config),
                classifier: Arc::clone(&classifier),
                catalog: Arc::clone(&self.catalog),
                executor: Arc::clone(&executor),
                rate: Arc::clone(&rate),
                stats: Arc::clone(&stats),
                logs: Arc::clone(&logs),
                stop: Arc::clone(&stop),
                deadline,
            }));
        }

        let stats_task = tokio::spawn(periodic_statistics(
            Arc::clone(&logs),
            Arc::clone(&stats),
            config.stats_interval,
        ));
        let progress_task = self.progress.clone().map(|progress| {
            tokio::spawn(report_progress(
                progress,
                session_id.clone(),
                Arc::clone(&stats),
                started,
                deadline,
            ))
        });

        let supervisor = tokio::spawn(supervise(Supervised {
            session_id: session_id.clone(),
            log_directory: config.log_directory.clone(),
            state: Arc::clone(&self.state),
            workers,
            stats_task,
            progress_task,
            stats: Arc::clone(&stats),
            logs,
            stop: Arc::clone(&stop),
            rate,
        }));

        *state = SessionState::Running;

        Ok(SessionHandle {
            session_id,
            stop,
            stats,
            supervisor,
        })
    }
}

/// Control over a running session.
pub struct SessionHandle {
    session_id: String,
    stop: Arc<StopSignal>,
    stats: Arc<Statistics>,
    supervisor: JoinHandle<SessionReport>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Ask workers to exit at their next loop boundary. In-flight requests finish.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// A cloneable stop handle, e.g. for a Ctrl-C listener.
    pub fn stop_signal(&self) -> Arc<StopSignal> {
        Arc::clone(&self.stop)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Wait for every worker to exit and the final statistics record to be written.
    pub async fn wait(self) -> Result<SessionReport> {
        Ok(self.supervisor.await?)
    }
}

struct Supervised {
    session_id: String,
    log_directory: PathBuf,
    state: Arc<Mutex<SessionState>>,
    workers: JoinSet<Result<WorkerExit>>,
    stats_task: JoinHandle<()>,
    progress_task: Option<JoinHandle<()>>,
    stats: Arc<Statistics>,
    logs: Arc<LogRouter>,
    stop: Arc<StopSignal>,
    rate: Arc<RateController>,
}

async fn supervise(mut s: Supervised) -> SessionReport {
    let mut reached_deadline = false;
    while let Some(joined) = s.workers.join_next().await {
        match joined {
            Ok(Ok(exit)) => reached_deadline |= exit == WorkerExit::Deadline,
            Ok(Err(err)) => tracing::error!(session_id = %s.session_id, error = %err, "worker failed"),
            Err(err) => {
                tracing::error!(session_id = %s.session_id, error = %err, "worker task panicked");
            }
        }
    }

    s.stats_task.abort();
    if let Some(task) = s.progress_task.take() {
        task.abort();
    }

    // A run that reached its deadline completed even if a stop arrived during the last request.
    let state = if s.stop.is_stopped() && !reached_deadline {
        SessionState::Cancelled
    } else {
        SessionState::Completed
    };

    let snapshot = s.stats.snapshot();
    emit_statistics(&s.logs, &snapshot, true);
    if let Err(err) = s.logs.flush() {
        tracing::warn!(session_id = %s.session_id, error = %err, "failed to flush log streams");
    }

    *lock_state(&s.state) = state;

    tracing::info!(
        session_id = %s.session_id,
        %state,
        total_requests = snapshot.total_requests,
        failed_requests = snapshot.failed_requests,
        skipped_slots = s.rate.skipped_slots(),
        "session finished"
    );

    SessionReport {
        session_id: s.session_id,
        state,
        stats: snapshot,
        log_directory: s.log_directory,
    }
}

async fn periodic_statistics(logs: Arc<LogRouter>, stats: Arc<Statistics>, every: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + every, every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        emit_statistics(&logs, &stats.snapshot(), false);
        // Push buffered traffic and dns records out with each snapshot.
        if let Err(err) = logs.flush() {
            tracing::warn!(%err, "flushing log streams failed");
        }
    }
}

async fn report_progress(
    progress: ProgressFn,
    session_id: String,
    stats: Arc<Statistics>,
    started: Instant,
    deadline: Instant,
) {
    let mut interval = tokio::time::interval_at(started + PROGRESS_INTERVAL, PROGRESS_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tick = 0u64;
    loop {
        interval.tick().await;
        tick += 1;
        let now = Instant::now();
        progress(ProgressUpdate {
            tick,
            session_id: session_id.clone(),
            elapsed: now.saturating_duration_since(started),
            remaining: deadline.saturating_duration_since(now),
            stats: stats.snapshot(),
        });
    }
}

fn emit_statistics(logs: &LogRouter, snapshot: &StatsSnapshot, last: bool) {
    let json = match serde_json::to_string(snapshot) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode statistics");
            return;
        }
    };
    if let Err(err) = logs.emit(
        LogStream::Statistics,
        &[("stats", json), ("final", last.to_string())],
    ) {
        tracing::warn!(error = %err, "failed to write statistics record");
    }
}

fn new_session_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn lock_state(state: &Mutex<SessionState>) -> std::sync::MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_eight_hex_chars() {
        let id = new_session_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, new_session_id());
    }
}
