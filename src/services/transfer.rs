//! Bulk export and import of saved requests.
//!
//! An export directory holds `requests/<id>.json` plus a `manifest.json`.
//! Secret refs are blanked on the way out so an export can be shared.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::request_store::{is_plain_id, json_files, read_request, write_json};
use super::{utc_stamp, RequestStore};
use crate::core::task::ExportReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub format: u32,
    pub exported_at: String,
    pub request_count: usize,
    pub secrets_included: bool,
    pub scrubbed_secret_ref_count: usize,
}

/// `./tuiman-export-YYYYMMDD-HHMMSS` in local time.
pub fn default_export_dir() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("./tuiman-export-{stamp}"))
}

pub fn export_requests(store: &dyn RequestStore, dir: Option<PathBuf>) -> Result<ExportReport> {
    let directory = dir.unwrap_or_else(default_export_dir);
    let requests_dir = directory.join("requests");
    fs::create_dir_all(&requests_dir)
        .with_context(|| format!("failed to create {}", requests_dir.display()))?;

    let requests = store.list()?;
    let mut scrubbed = 0;
    for mut request in requests.iter().cloned() {
        if !request.auth_secret_ref.is_empty() {
            scrubbed += 1;
            request.auth_secret_ref.clear();
        }
        if !is_plain_id(&request.id) {
            tracing::warn!("skipping export of request with id {:?}", request.id);
            continue;
        }
        write_json(&requests_dir.join(format!("{}.json", request.id)), &request)?;
    }

    let manifest = Manifest {
        format: 1,
        exported_at: utc_stamp(),
        request_count: requests.len(),
        secrets_included: false,
        scrubbed_secret_ref_count: scrubbed,
    };
    write_json(&directory.join("manifest.json"), &manifest)?;
    tracing::info!(
        "exported {} request(s) to {}",
        requests.len(),
        directory.display()
    );
    Ok(ExportReport {
        directory,
        count: requests.len(),
        scrubbed,
    })
}

/// Save every request found under `<dir>/requests`. Unreadable files are
/// skipped; requests without an id get a fresh one.
pub fn import_requests(store: &dyn RequestStore, dir: &Path) -> Result<usize> {
    let requests_dir = dir.join("requests");
    if !requests_dir.is_dir() {
        bail!("{} is not a directory", requests_dir.display());
    }
    let mut count = 0;
    for path in json_files(&requests_dir)? {
        let request = match read_request(&path) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("skipping import file: {e:#}");
                continue;
            }
        };
        match store.save(request) {
            Ok(_) => count += 1,
            Err(e) => tracing::warn!("failed to import {}: {e:#}", path.display()),
        }
    }
    tracing::info!("imported {count} request(s) from {}", dir.display());
    Ok(count)
}
