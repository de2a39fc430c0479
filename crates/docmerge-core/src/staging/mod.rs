//! Per-request staging directories.
//!
//! Each request gets a fresh directory named `<prefix>_<host>_<TOKEN>` under
//! the staging root. Creation is a single exclusive `mkdir`, so two concurrent
//! allocations can never end up sharing a directory; on a name collision a new
//! token is drawn, up to a fixed number of attempts.

mod host;
mod token;

pub use host::host_identifier;
pub use token::{is_token_char, unique_token, TOKEN_ALPHABET};

use std::fmt;
use std::fs::{self, DirBuilder};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::MergeConfig;
use crate::error::MergeError;

/// Directory owned by exactly one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLocation {
    path: PathBuf,
    name: String,
}

impl StagingLocation {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name (last path component).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }

    /// Delete the directory and anything in it. Only used when a request is
    /// abandoned; finished staging areas are left for external retention.
    pub fn remove(&self) -> io::Result<()> {
        fs::remove_dir_all(&self.path)
    }
}

type TokenSource = Arc<dyn Fn(usize) -> String + Send + Sync>;

/// Creates uniquely named staging directories under a root.
#[derive(Clone)]
pub struct StagingAreaAllocator {
    root: PathBuf,
    prefix: String,
    host: String,
    token_length: usize,
    max_attempts: u32,
    tokens: TokenSource,
}

impl fmt::Debug for StagingAreaAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagingAreaAllocator")
            .field("root", &self.root)
            .field("prefix", &self.prefix)
            .field("host", &self.host)
            .field("token_length", &self.token_length)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl StagingAreaAllocator {
    pub fn new(
        root: impl Into<PathBuf>,
        prefix: impl Into<String>,
        token_length: usize,
        max_attempts: u32,
    ) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            host: host_identifier(),
            token_length,
            max_attempts: max_attempts.max(1),
            tokens: Arc::new(unique_token),
        }
    }

    pub fn from_config(cfg: &MergeConfig) -> Self {
        Self::new(
            &cfg.staging_root,
            &cfg.staging_prefix,
            cfg.token_length,
            cfg.max_allocation_attempts,
        )
    }

    /// Replace the random token generator (deterministic tests, collision drills).
    pub fn with_token_source<F>(mut self, tokens: F) -> Self
    where
        F: Fn(usize) -> String + Send + Sync + 'static,
    {
        self.tokens = Arc::new(tokens);
        self
    }

    /// Override the host component of directory names.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidate_name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.prefix,
            self.host,
            (self.tokens)(self.token_length)
        )
    }

    /// Create a new, empty staging directory.
    ///
    /// Fails with [`MergeError::Allocation`] when every attempted name was
    /// already taken, and with [`MergeError::DirectoryCreation`] (no retry)
    /// for any other filesystem error.
    pub fn allocate(&self) -> Result<StagingLocation, MergeError> {
        fs::create_dir_all(&self.root).map_err(|source| MergeError::DirectoryCreation {
            path: self.root.clone(),
            source,
        })?;

        for attempt in 1..=self.max_attempts {
            let name = self.candidate_name();
            let path = self.root.join(&name);

            match DirBuilder::new().create(&path) {
                Ok(()) => {
                    verify_directory(&path)?;
                    open_permissions(&path)?;
                    tracing::debug!(path = %path.display(), attempt, "allocated staging directory");
                    return Ok(StagingLocation { path, name });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), attempt, "staging name collision, retrying");
                }
                Err(source) => {
                    tracing::error!(path = %path.display(), "unable to create staging directory: {}", source);
                    return Err(MergeError::DirectoryCreation { path, source });
                }
            }
        }

        tracing::error!(
            root = %self.root.display(),
            attempts = self.max_attempts,
            "no unused staging directory name found"
        );
        Err(MergeError::Allocation {
            attempts: self.max_attempts,
        })
    }

    /// Regular expression matching the staging directories this host creates,
    /// for use by an external cleanup job.
    pub fn staging_pattern(&self) -> String {
        format!(
            "^{}_{}_[A-Z0-9]{{{}}}$",
            self.prefix, self.host, self.token_length
        )
    }

    /// Whether `name` has the shape of a staging directory created by this allocator.
    pub fn is_staging_name(&self, name: &str) -> bool {
        let Some(rest) = name
            .strip_prefix(self.prefix.as_str())
            .and_then(|r| r.strip_prefix('_'))
            .and_then(|r| r.strip_prefix(self.host.as_str()))
            .and_then(|r| r.strip_prefix('_'))
        else {
            return false;
        };
        rest.len() == self.token_length && rest.chars().all(is_token_char)
    }
}

fn verify_directory(path: &Path) -> Result<(), MergeError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(MergeError::DirectoryCreation {
            path: path.to_path_buf(),
            source: io::Error::other("path exists but is not a directory"),
        }),
        Err(source) => Err(MergeError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// rwx for everyone, so the merge step can write and the web server can read.
#[cfg(unix)]
fn open_permissions(path: &Path) -> Result<(), MergeError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o777)).map_err(|source| {
        MergeError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn open_permissions(_path: &Path) -> Result<(), MergeError> {
    Ok(())
}
