//! Error taxonomy surfaced to the request handler.

use std::path::PathBuf;

use crate::merger::MergerError;
use crate::request::ErrorResponse;

/// How the request handler should present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is unusable; retrying unchanged will fail again.
    BadRequest,
    /// Something on the service side failed; the caller may retry.
    Internal,
    /// The service is misconfigured; every request fails until it is fixed.
    Unavailable,
}

/// Failure of one merge request. Exactly one of these or a result path is
/// produced per request.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("There are no input files to merge.")]
    NoInputFiles,

    #[error("None of the input files could be opened for merging ({invalid} rejected). Processing will not continue.")]
    InsufficientValidInput { invalid: usize },

    #[error("Unable to create the staging directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to find an unused staging directory name after {attempts} attempts.")]
    Allocation { attempts: u32 },

    #[error("Unable to generate the merged output file: {0}")]
    MergeExecution(#[source] MergerError),

    #[error("The output file {} is outside the published base path.", path.display())]
    UrlTranslation { path: PathBuf },

    #[error("The merged output file {} does not exist.", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("The merge request was cancelled.")]
    Cancelled,

    #[error("The service is not configured correctly: {0}")]
    Configuration(String),
}

impl MergeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MergeError::NoInputFiles | MergeError::InsufficientValidInput { .. } => {
                ErrorKind::BadRequest
            }
            MergeError::Configuration(_) => ErrorKind::Unavailable,
            MergeError::DirectoryCreation { .. }
            | MergeError::Allocation { .. }
            | MergeError::MergeExecution(_)
            | MergeError::UrlTranslation { .. }
            | MergeError::MissingArtifact { .. }
            | MergeError::Cancelled => ErrorKind::Internal,
        }
    }

    /// True when the same request may succeed if submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MergeError::DirectoryCreation { .. }
                | MergeError::Allocation { .. }
                | MergeError::MergeExecution(_)
                | MergeError::Cancelled
        )
    }
}

impl From<&MergeError> for ErrorResponse {
    fn from(err: &MergeError) -> Self {
        ErrorResponse {
            error: err.to_string(),
        }
    }
}

impl From<MergeError> for ErrorResponse {
    fn from(err: MergeError) -> Self {
        ErrorResponse::from(&err)
    }
}
