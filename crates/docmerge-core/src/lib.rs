pub mod config;
pub mod logging;

pub mod archive;
pub mod control;
pub mod error;
pub mod filename;
pub mod merger;
pub mod orchestrator;
pub mod request;
pub mod resolver;
pub mod service;
pub mod staging;
pub mod storage;
pub mod url_translator;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::MergeConfig;
pub use control::CancelToken;
pub use error::{ErrorKind, MergeError};
pub use merger::{DocumentMerger, InputDocument, MergerError, QpdfMerger};
pub use request::{ErrorResponse, MergeRequest, UrlResponse};
pub use service::{DownloadArtifact, MergeService};
