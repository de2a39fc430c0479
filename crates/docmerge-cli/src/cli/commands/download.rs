//! `docmerge download` – merge files and copy the result to a local path.

use anyhow::{Context, Result};
use docmerge_core::{CancelToken, MergeConfig, MergeRequest, MergeService};
use std::path::Path;
use std::sync::Arc;

use super::{build_request, build_service, cancel_on_interrupt};

pub async fn run_download(
    cfg: &MergeConfig,
    name: Option<String>,
    files: Vec<String>,
    out: &Path,
) -> Result<()> {
    let service = build_service(cfg);
    let request = build_request(name, files);
    let written = download_to(&service, request, cancel_on_interrupt(), out).await?;
    println!("{}", written);
    Ok(())
}

/// Merge on the blocking pool and copy the artifact to `out`. Returns the
/// header the artifact would be served with.
pub(crate) async fn download_to(
    service: &Arc<MergeService>,
    request: MergeRequest,
    cancel: CancelToken,
    out: &Path,
) -> Result<String> {
    let svc = Arc::clone(service);
    let artifact = tokio::task::spawn_blocking(move || svc.merge_for_download(&request, &cancel))
        .await
        .context("merge task join")??;

    std::fs::copy(&artifact.path, out)
        .with_context(|| format!("copy {} to {}", artifact.path.display(), out.display()))?;
    tracing::info!(out = %out.display(), "wrote merged document");
    Ok(format!(
        "{} ({})",
        out.display(),
        artifact.content_disposition()
    ))
}
