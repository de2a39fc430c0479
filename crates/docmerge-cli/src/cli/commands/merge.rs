//! `docmerge merge` – merge files and print `{"url": ...}` or `{"error": ...}`.

use anyhow::Result;
use docmerge_core::{ErrorResponse, MergeError, MergeRequest, MergeService, UrlResponse};
use docmerge_core::{CancelToken, MergeConfig};
use std::io::Write;
use std::sync::Arc;

use super::{build_request, build_service, cancel_on_interrupt};

pub async fn run_merge(cfg: &MergeConfig, name: Option<String>, files: Vec<String>) -> Result<()> {
    let service = build_service(cfg);
    let request = build_request(name, files);
    merge_and_report(&service, request, cancel_on_interrupt(), &mut std::io::stdout()).await
}

/// Merge `request` and write the response body as one JSON line to `out`.
/// A failed merge is reported in the body and returned as an error.
pub(crate) async fn merge_and_report<W: Write>(
    service: &Arc<MergeService>,
    request: MergeRequest,
    cancel: CancelToken,
    out: &mut W,
) -> Result<()> {
    let result = service.merge_to_url_async(request, cancel).await;
    writeln!(out, "{}", render(&result)?)?;
    result.map(|_| ()).map_err(anyhow::Error::from)
}

pub(crate) fn render(result: &Result<UrlResponse, MergeError>) -> Result<String> {
    let body = match result {
        Ok(resp) => serde_json::to_string(resp)?,
        Err(err) => serde_json::to_string(&ErrorResponse::from(err))?,
    };
    Ok(body)
}
