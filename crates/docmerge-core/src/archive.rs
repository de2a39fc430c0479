//! Best-effort archive of accepted requests as pretty-printed JSON.
//!
//! Records are named after the second they were written, so two requests
//! archived in the same second overwrite each other.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::config::MergeConfig;
use crate::request::MergeRequest;

const RECORD_PREFIX: &str = "MergeRequest_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H-%M-%S";

#[derive(Debug, Clone)]
pub struct RequestArchiveService {
    dir: Option<PathBuf>,
}

impl RequestArchiveService {
    /// Archive into `dir`, creating it if needed. `None`, or a directory that
    /// cannot be created, disables archiving.
    pub fn new(dir: Option<PathBuf>) -> Self {
        let dir = dir.and_then(|dir| match std::fs::create_dir_all(&dir) {
            Ok(()) => Some(dir),
            Err(e) => {
                tracing::error!(
                    dir = %dir.display(),
                    "cannot create request archive directory, archiving disabled: {}",
                    e
                );
                None
            }
        });
        Self { dir }
    }

    pub fn from_config(cfg: &MergeConfig) -> Self {
        Self::new(cfg.archive_dir.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn archive_request(&self, request: &MergeRequest) {
        self.archive_request_at(request, Local::now());
    }

    /// Write `request` under the record name for `at`. Failures are logged.
    pub fn archive_request_at(&self, request: &MergeRequest, at: DateTime<Local>) {
        let Some(dir) = &self.dir else {
            return;
        };
        let path = record_path(dir, at);
        match write_record(&path, request) {
            Ok(()) => tracing::debug!(path = %path.display(), "archived request"),
            Err(e) => tracing::error!("failed to archive request: {:#}", e),
        }
    }
}

pub fn record_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}{}.json", RECORD_PREFIX, at.format(TIMESTAMP_FORMAT)))
}

fn write_record(path: &Path, request: &MergeRequest) -> Result<()> {
    let json = serde_json::to_string_pretty(request).context("serialize merge request")?;
    std::fs::write(path, json).with_context(|| format!("write archive record: {}", path.display()))?;
    Ok(())
}
