//! Resolve opaque input locations into local filesystem paths.
//!
//! Inputs arrive as plain paths, `file://` URIs, or URIs whose scheme names a
//! remote store mounted locally (e.g. `s3://bucket/key` with the bucket tree
//! mounted under `/mnt/s3`). Mounting itself happens outside this crate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("location is empty")]
    Empty,
    #[error("location {location:?} is not a valid URI: {reason}")]
    InvalidUri { location: String, reason: String },
    #[error("location {location:?} uses scheme {scheme:?} which has no configured mount")]
    UnsupportedScheme { location: String, scheme: String },
}

/// Maps location strings onto paths the runtime can open.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    mounts: BTreeMap<String, PathBuf>,
}

impl PathResolver {
    pub fn new(mounts: BTreeMap<String, PathBuf>) -> Self {
        let mounts = mounts
            .into_iter()
            .map(|(scheme, root)| (scheme.to_ascii_lowercase(), root))
            .collect();
        Self { mounts }
    }

    pub fn resolve(&self, location: &str) -> Result<PathBuf, ResolveError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ResolveError::Empty);
        }
        if !has_uri_scheme(location) {
            return Ok(PathBuf::from(location));
        }

        let parsed = url::Url::parse(location).map_err(|e| ResolveError::InvalidUri {
            location: location.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() == "file" {
            return parsed.to_file_path().map_err(|()| ResolveError::InvalidUri {
                location: location.to_string(),
                reason: "not a local file URI".to_string(),
            });
        }

        let root = self
            .mounts
            .get(parsed.scheme())
            .ok_or_else(|| ResolveError::UnsupportedScheme {
                location: location.to_string(),
                scheme: parsed.scheme().to_string(),
            })?;
        Ok(mounted_path(root, parsed.host_str(), parsed.path()))
    }
}

/// `scheme://...` with an RFC 3986 scheme. Single-letter schemes are treated
/// as Windows drive letters, not URIs.
fn has_uri_scheme(location: &str) -> bool {
    let Some((scheme, _)) = location.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    scheme.len() > 1
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn mounted_path(root: &Path, host: Option<&str>, path: &str) -> PathBuf {
    let mut out = root.to_path_buf();
    if let Some(host) = host.filter(|h| !h.is_empty()) {
        out.push(host);
    }
    for segment in path.split('/').filter(|s| !s.is_empty() && *s != "." && *s != "..") {
        out.push(segment);
    }
    out
}
