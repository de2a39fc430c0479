//! Output artifact lifecycle.
//!
//! The merge backend writes to `<destination>.part`; only a successful merge
//! renames it to the final name. A partial file is removed when its guard is
//! dropped without being finalized, so a failed merge never leaves something
//! that looks like a result.

use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `merged.pdf` → `merged.pdf.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Guard over an in-progress artifact.
#[derive(Debug)]
pub struct PendingArtifact {
    temp_path: PathBuf,
    final_path: PathBuf,
    finalized: bool,
}

impl PendingArtifact {
    pub fn new(final_path: impl Into<PathBuf>) -> Self {
        let final_path = final_path.into();
        Self {
            temp_path: temp_path(&final_path),
            final_path,
            finalized: false,
        }
    }

    /// Where the merge backend should write.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Atomically rename the temp file to the final path.
    pub fn finalize(mut self) -> io::Result<PathBuf> {
        std::fs::rename(&self.temp_path, &self.final_path)?;
        self.finalized = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for PendingArtifact {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        match std::fs::remove_file(&self.temp_path) {
            Ok(()) => {
                tracing::debug!(path = %self.temp_path.display(), "removed partial output");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.temp_path.display(), "failed to remove partial output: {}", e);
            }
        }
    }
}
