use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::PathBuf;

use super::{utc_stamp, HistoryStore};
use crate::core::request::RunEntry;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id TEXT NOT NULL,
    request_name TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status_code INTEGER,
    duration_ms INTEGER,
    error TEXT,
    created_at TEXT NOT NULL,
    request_snapshot TEXT,
    response_body TEXT
);
";

/// Run history in a SQLite database. Each call opens its own connection so
/// the store can be shared across worker threads.
pub struct SqliteHistoryStore {
    path: PathBuf,
}

impl SqliteHistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        conn.execute_batch(SCHEMA)
            .context("failed to initialize history schema")?;
        Ok(conn)
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn list(&self, limit: usize) -> Result<Vec<RunEntry>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, request_id, request_name, method, url, status_code, duration_ms,
                    error, created_at, request_snapshot, response_body
             FROM runs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RunEntry {
                id: row.get(0)?,
                request_id: row.get(1)?,
                request_name: row.get(2)?,
                method: row.get(3)?,
                url: row.get(4)?,
                status_code: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
                duration_ms: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
                error: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                created_at: row.get(8)?,
                request_snapshot: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                response_body: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
            })
        })?;
        let runs = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }

    fn record(&self, run: &RunEntry) -> Result<i64> {
        let conn = self.open()?;
        let created_at = if run.created_at.is_empty() {
            utc_stamp()
        } else {
            run.created_at.clone()
        };
        conn.execute(
            "INSERT INTO runs (request_id, request_name, method, url, status_code, duration_ms,
                               error, created_at, request_snapshot, response_body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                run.request_id,
                run.request_name,
                run.method,
                run.url,
                run.status_code,
                run.duration_ms,
                run.error,
                created_at,
                run.request_snapshot,
                run.response_body,
            ],
        )
        .context("failed to record run")?;
        Ok(conn.last_insert_rowid())
    }
}
