//! CLI command handlers, one per file.

mod config;
mod download;
mod merge;
mod url;

pub use config::run_config;
pub use download::run_download;
pub use merge::run_merge;
pub use url::run_url;

#[cfg(test)]
pub(crate) use config::describe;
#[cfg(test)]
pub(crate) use download::download_to;
#[cfg(test)]
pub(crate) use merge::{merge_and_report, render};

use docmerge_core::{CancelToken, MergeConfig, MergeRequest, MergeService, QpdfMerger};
use std::sync::Arc;

fn build_service(cfg: &MergeConfig) -> Arc<MergeService> {
    let merger = Arc::new(QpdfMerger::from_config(&cfg.merger));
    Arc::new(MergeService::new(cfg, merger))
}

fn build_request(name: Option<String>, files: Vec<String>) -> MergeRequest {
    let request = MergeRequest::new(files);
    match name {
        Some(name) => request.with_output_filename(name),
        None => request,
    }
}

/// Token that is cancelled when the user presses Ctrl-C.
fn cancel_on_interrupt() -> CancelToken {
    let token = CancelToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling merge");
            handle.cancel();
        }
    });
    token
}
