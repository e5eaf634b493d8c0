//! Work the engine hands off to collaborators, and what comes back.
//!
//! A [`Task`] is plain data; it runs on a worker thread and its
//! [`TaskOutcome`] is applied later by `Engine::apply_outcome` on the UI
//! thread, against whatever the state is by then.

use anyhow::Result;
use std::path::PathBuf;

use super::request::{HttpResponse, Request, RunEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Initial load of requests and runs.
    Bootstrap,
    /// Fetch runs and switch to the history screen.
    LoadHistory,
    Send(Request),
    /// Re-send the current version of the request behind a run.
    Replay { run_id: i64, request_id: String },
    Save { request: Request, origin: SaveOrigin },
    Delete { id: String },
    StoreSecret { secret_ref: String, value: String },
    Export { dir: Option<PathBuf> },
    Import { dir: PathBuf },
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Bootstrap => "bootstrap",
            Task::LoadHistory => "load-history",
            Task::Send(_) => "send",
            Task::Replay { .. } => "replay",
            Task::Save { .. } => "save",
            Task::Delete { .. } => "delete",
            Task::StoreSecret { .. } => "store-secret",
            Task::Export { .. } => "export",
            Task::Import { .. } => "import",
        }
    }
}

/// Who asked for a save; decides the status text and whether the editor closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    /// The field editor; `session` identifies which opening of it.
    Editor { session: u64 },
    BodyEdit,
}

/// A finished HTTP round trip plus the bookkeeping done after it.
#[derive(Debug)]
pub struct SendReport {
    pub request: Request,
    pub response: HttpResponse,
    /// When the response arrived, UTC `YYYY-MM-DDTHH:MM:SSZ`.
    pub at: String,
    /// Row id of the recorded run.
    pub recorded: Result<i64>,
    /// Fresh run list when it could be read back.
    pub runs: Option<Vec<RunEntry>>,
    /// Set when this send replayed a history entry.
    pub replay_of: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub directory: PathBuf,
    pub count: usize,
    pub scrubbed: usize,
}

#[derive(Debug)]
pub enum TaskOutcome {
    Loaded {
        requests: Result<Vec<Request>>,
        runs: Result<Vec<RunEntry>>,
    },
    HistoryLoaded(Result<Vec<RunEntry>>),
    Sent(SendReport),
    /// Replay could not start: the request is gone or the lookup failed.
    ReplayFailed {
        run_id: i64,
        error: Option<anyhow::Error>,
    },
    Saved {
        origin: SaveOrigin,
        result: Result<(Request, Vec<Request>)>,
    },
    Deleted(Result<Vec<Request>>),
    SecretStored {
        secret_ref: String,
        result: Result<()>,
    },
    Exported(Result<ExportReport>),
    Imported {
        dir: PathBuf,
        result: Result<(usize, Vec<Request>)>,
    },
}
