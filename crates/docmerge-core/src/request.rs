//! Inbound request and outbound response shapes.
//!
//! The transport layer deserializes JSON into [`MergeRequest`] and serializes
//! either [`UrlResponse`] or [`ErrorResponse`] back to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A client-initiated merge: ordered inputs plus an optional output name.
///
/// Unknown JSON fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Suggested name of the merged document. Optional.
    #[serde(rename = "file_name", alias = "output_filename", default)]
    pub output_filename: Option<String>,
    /// Input locations, in merge order.
    #[serde(default)]
    pub files: Vec<String>,
}

impl MergeRequest {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output_filename: None,
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_output_filename(mut self, name: impl Into<String>) -> Self {
        self.output_filename = Some(name.into());
        self
    }
}

impl fmt::Display for MergeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "merge request: output={:?}, {} file(s)",
            self.output_filename.as_deref().unwrap_or(""),
            self.files.len()
        )
    }
}

/// Successful response body: `{ "url": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlResponse {
    pub url: String,
}

/// Failure response body: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
