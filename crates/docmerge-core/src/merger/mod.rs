//! Boundary to the external document-merge capability.
//!
//! The pipeline only needs two things from a merge backend: a cheap "can this
//! be opened as a mergeable document" probe, and a merge of already-opened
//! inputs into a destination path. Byte-level handling of the document format
//! lives entirely behind [`DocumentMerger`].

mod qpdf;

pub use qpdf::QpdfMerger;

use std::fs::File;
use std::path::{Path, PathBuf};

/// Failure reported by a merge backend.
#[derive(Debug, thiserror::Error)]
pub enum MergerError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a mergeable document: {reason}", path.display())]
    InvalidDocument { path: PathBuf, reason: String },
    #[error("merge tool failed: {0}")]
    Tool(String),
}

impl MergerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MergerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// One validated input, opened for reading. The handle is closed when the
/// value is dropped.
#[derive(Debug)]
pub struct InputDocument {
    location: String,
    path: PathBuf,
    file: File,
}

impl InputDocument {
    pub fn open(location: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, MergerError> {
        let path = path.into();
        let file = File::open(&path).map_err(|e| MergerError::io(&path, e))?;
        Ok(Self {
            location: location.into(),
            path,
            file,
        })
    }

    /// Location string as supplied in the request.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

/// External merge capability.
///
/// `merge` must either leave a complete document at `destination` or return
/// an error; whatever it wrote on failure is discarded by the caller.
pub trait DocumentMerger: Send + Sync {
    /// Check that `path` can be opened as a mergeable document.
    fn probe(&self, path: &Path) -> Result<(), MergerError>;

    /// Merge `inputs`, in order, into a new document at `destination`.
    fn merge(&self, inputs: &mut [InputDocument], destination: &Path) -> Result<(), MergerError>;
}
