//! Request-facing facade: archive, merge, then publish a URL or hand back the file.
//!
//! One [`MergeService`] is built at startup and shared (behind an `Arc`) by
//! every request handler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::RequestArchiveService;
use crate::config::MergeConfig;
use crate::control::CancelToken;
use crate::error::MergeError;
use crate::merger::{DocumentMerger, MergerError};
use crate::orchestrator::MergeOrchestrator;
use crate::request::{MergeRequest, UrlResponse};
use crate::url_translator::UrlTranslator;

/// A merged document to be streamed back as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub path: PathBuf,
    pub file_name: String,
}

impl DownloadArtifact {
    /// Value for the `Content-Disposition` response header.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"{}\"",
            self.file_name.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }
}

pub struct MergeService {
    archive: RequestArchiveService,
    orchestrator: MergeOrchestrator,
    /// Holds the configuration problem message when the service cannot publish URLs.
    translator: Result<UrlTranslator, String>,
}

impl MergeService {
    /// Build the service. Never fails: a bad configuration is reported on
    /// every request as [`MergeError::Configuration`].
    pub fn new(cfg: &MergeConfig, merger: Arc<dyn DocumentMerger>) -> Self {
        let translator = cfg
            .validate()
            .and_then(|()| UrlTranslator::from_config(cfg))
            .map_err(|e| {
                tracing::error!("invalid merge configuration: {}", e);
                e.to_string()
            });
        Self {
            archive: RequestArchiveService::from_config(cfg),
            orchestrator: MergeOrchestrator::from_config(cfg, merger),
            translator,
        }
    }

    /// Merge and return the public URL of the result.
    pub fn merge_to_url(&self, request: &MergeRequest) -> Result<UrlResponse, MergeError> {
        self.merge_to_url_with_cancel(request, &CancelToken::new())
    }

    pub fn merge_to_url_with_cancel(
        &self,
        request: &MergeRequest,
        cancel: &CancelToken,
    ) -> Result<UrlResponse, MergeError> {
        let translator = self.translator()?;
        let path = self.accept_and_merge(request, cancel)?;
        let url = translator.to_url(&path.to_string_lossy())?;
        Ok(UrlResponse { url })
    }

    /// Run [`merge_to_url_with_cancel`](Self::merge_to_url_with_cancel) on the
    /// blocking pool.
    pub async fn merge_to_url_async(
        self: &Arc<Self>,
        request: MergeRequest,
        cancel: CancelToken,
    ) -> Result<UrlResponse, MergeError> {
        let service = Arc::clone(self);
        tokio::task::spawn_blocking(move || service.merge_to_url_with_cancel(&request, &cancel))
            .await
            .map_err(|e| {
                MergeError::MergeExecution(MergerError::Tool(format!("merge task failed: {}", e)))
            })?
    }

    /// Merge and return the result file for an attachment response.
    pub fn merge_for_download(
        &self,
        request: &MergeRequest,
        cancel: &CancelToken,
    ) -> Result<DownloadArtifact, MergeError> {
        self.translator()?;
        let path = self.accept_and_merge(request, cancel)?;
        if !path.is_file() {
            tracing::error!(path = %path.display(), "merged output missing");
            return Err(MergeError::MissingArtifact { path });
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| MergeError::MissingArtifact { path: path.clone() })?;
        Ok(DownloadArtifact { path, file_name })
    }

    /// URL for an existing output path.
    pub fn translate(&self, path: &Path) -> Result<String, MergeError> {
        self.translator()?.to_url(&path.to_string_lossy())
    }

    fn translator(&self) -> Result<&UrlTranslator, MergeError> {
        self.translator
            .as_ref()
            .map_err(|msg| MergeError::Configuration(msg.clone()))
    }

    fn accept_and_merge(
        &self,
        request: &MergeRequest,
        cancel: &CancelToken,
    ) -> Result<PathBuf, MergeError> {
        tracing::info!("accepted {}", request);
        self.archive.archive_request(request);
        self.orchestrator.merge_with_cancel(request, cancel)
    }
}
