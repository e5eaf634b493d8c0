//! Collaborators behind the engine: storage, HTTP, secrets, and the worker
//! that runs [`Task`]s off the UI thread.

pub mod clipboard;
pub mod editor;
pub mod history_store;
pub mod http_client;
pub mod keychain;
pub mod request_store;
pub mod transfer;

use anyhow::Result;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::core::paths::AppPaths;
use crate::core::request::{HttpResponse, Request, RunEntry};
use crate::core::settings::Settings;
use crate::core::task::{SendReport, Task, TaskOutcome};

pub use history_store::SqliteHistoryStore;
pub use http_client::HttpClient;
pub use keychain::Keychain;
pub use request_store::FileRequestStore;

/// Failures the UI reports as named platform limitations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Unsupported(&'static str),
}

pub trait RequestStore: Send + Sync {
    /// Every stored request, sorted by name.
    fn list(&self) -> Result<Vec<Request>>;
    /// Persist `request`, assigning an id when it has none.
    fn save(&self, request: Request) -> Result<Request>;
    fn delete(&self, id: &str) -> Result<()>;
}

pub trait HistoryStore: Send + Sync {
    /// Most recent runs first.
    fn list(&self, limit: usize) -> Result<Vec<RunEntry>>;
    /// Append a run and return its id.
    fn record(&self, run: &RunEntry) -> Result<i64>;
}

pub trait HttpExecutor: Send + Sync {
    /// Never fails: transport problems come back as a zero status.
    fn execute(&self, request: &Request) -> HttpResponse;
}

pub trait SecretStore: Send + Sync {
    /// `Ok(None)` when no secret is stored under `secret_ref`.
    fn get(&self, secret_ref: &str) -> Result<Option<String>>;
    fn set(&self, secret_ref: &str, value: &str) -> Result<()>;
}

/// UTC timestamp without fractional seconds, e.g. `2026-03-01T12:00:00Z`.
pub fn utc_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub struct Services {
    pub requests: Box<dyn RequestStore>,
    pub history: Box<dyn HistoryStore>,
    pub http: Box<dyn HttpExecutor>,
    pub secrets: Arc<dyn SecretStore>,
    pub history_limit: usize,
}

impl Services {
    /// The on-disk stores, real HTTP client and system keychain.
    pub fn production(paths: &AppPaths, settings: &Settings) -> Result<Self> {
        let secrets: Arc<dyn SecretStore> = Arc::new(Keychain::new());
        Ok(Self {
            requests: Box::new(FileRequestStore::new(paths.requests_dir.clone())),
            history: Box::new(SqliteHistoryStore::new(paths.history_db.clone())),
            http: Box::new(HttpClient::new(settings.http_timeout_secs, Arc::clone(&secrets))?),
            secrets,
            history_limit: settings.history_limit,
        })
    }

    fn requests_after<T>(&self, value: T) -> Result<(T, Vec<Request>)> {
        Ok((value, self.requests.list()?))
    }
}

/// Execute one task to completion on the calling thread.
pub fn run_task(services: &Services, task: Task) -> TaskOutcome {
    match task {
        Task::Bootstrap => TaskOutcome::Loaded {
            requests: services.requests.list(),
            runs: services.history.list(services.history_limit),
        },
        Task::LoadHistory => TaskOutcome::HistoryLoaded(services.history.list(services.history_limit)),
        Task::Send(request) => TaskOutcome::Sent(send(services, request, None)),
        Task::Replay { run_id, request_id } => match services.requests.list() {
            Err(error) => TaskOutcome::ReplayFailed {
                run_id,
                error: Some(error),
            },
            Ok(list) => match list.into_iter().find(|r| r.id == request_id) {
                Some(request) => TaskOutcome::Sent(send(services, request, Some(run_id))),
                None => TaskOutcome::ReplayFailed { run_id, error: None },
            },
        },
        Task::Save { request, origin } => TaskOutcome::Saved {
            origin,
            result: services
                .requests
                .save(request)
                .and_then(|saved| services.requests_after(saved)),
        },
        Task::Delete { id } => TaskOutcome::Deleted(
            services
                .requests
                .delete(&id)
                .and_then(|()| services.requests.list()),
        ),
        Task::StoreSecret { secret_ref, value } => {
            let result = services.secrets.set(&secret_ref, &value);
            TaskOutcome::SecretStored { secret_ref, result }
        }
        Task::Export { dir } => {
            TaskOutcome::Exported(transfer::export_requests(services.requests.as_ref(), dir))
        }
        Task::Import { dir } => {
            let result = transfer::import_requests(services.requests.as_ref(), &dir)
                .and_then(|count| services.requests_after(count));
            TaskOutcome::Imported { dir, result }
        }
    }
}

fn send(services: &Services, request: Request, replay_of: Option<i64>) -> SendReport {
    tracing::info!("sending {} {}", request.method, request.url);
    let response = services.http.execute(&request);
    let at = utc_stamp();
    let mut run = RunEntry::from_response(&request, &response);
    run.created_at = at.clone();
    let recorded = services.history.record(&run);
    if let Err(e) = &recorded {
        tracing::warn!("failed to record run: {e:#}");
    }
    let runs = match services.history.list(services.history_limit) {
        Ok(runs) => Some(runs),
        Err(e) => {
            tracing::warn!("failed to reload history: {e:#}");
            None
        }
    };
    SendReport {
        request,
        response,
        at,
        recorded,
        runs,
        replay_of,
    }
}

// ─── Task runner ──────────────────────────────────────────────────────────────

/// Runs tasks on worker threads; outcomes come back over a channel that the
/// UI thread drains with [`TaskRunner::poll_outcomes`].
pub struct TaskRunner {
    services: Arc<Services>,
    outcome_tx: Sender<TaskOutcome>,
    outcome_rx: Receiver<TaskOutcome>,
    in_flight: usize,
}

impl TaskRunner {
    pub fn new(services: Services) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            services: Arc::new(services),
            outcome_tx,
            outcome_rx,
            in_flight: 0,
        }
    }

    pub fn dispatch(&mut self, task: Task) {
        tracing::debug!("dispatching {} task", task.name());
        self.in_flight += 1;
        let services = Arc::clone(&self.services);
        let tx = self.outcome_tx.clone();
        thread::spawn(move || {
            let outcome = run_task(&services, task);
            // The receiver only goes away when the UI is shutting down.
            let _ = tx.send(outcome);
        });
    }

    /// Tasks dispatched but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Collect finished outcomes without blocking.
    pub fn poll_outcomes(&mut self) -> Vec<TaskOutcome> {
        let mut outcomes = Vec::new();
        let max_outcomes = 50;
        while outcomes.len() < max_outcomes {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => break,
            }
        }
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }
}
