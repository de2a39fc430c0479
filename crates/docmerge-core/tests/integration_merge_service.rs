//! Integration test: JSON request in, merged document and public URL out.
//!
//! Drives `MergeService` the way a request handler would: deserializes a
//! request body, merges on the blocking pool, and checks the response JSON,
//! the staged file and the archive record.

mod common;

use std::sync::Arc;

use common::fake_merger::{write_input, ConcatMerger};
use docmerge_core::request::{ErrorResponse, MergeRequest};
use docmerge_core::{CancelToken, MergeConfig, MergeError, MergeService};
use tempfile::tempdir;

fn config(base: &std::path::Path) -> MergeConfig {
    MergeConfig {
        staging_root: base.join("staging"),
        base_path: base.to_string_lossy().into_owned(),
        base_url: "https://docs.example.org/merged".into(),
        archive_dir: Some(base.join("archive")),
        staging_prefix: "nga".into(),
        ..MergeConfig::default()
    }
}

#[tokio::test]
async fn json_request_produces_url_file_and_archive_record() {
    let inputs = tempdir().unwrap();
    let base = tempdir().unwrap();
    let a = write_input(inputs.path(), "a.pdf", b"%PDF-A|");
    let junk = write_input(inputs.path(), "notes.txt", b"plain text");
    let b = write_input(inputs.path(), "b.pdf", b"%PDF-B|");

    let body = serde_json::json!({
        "file_name": "Quarterly Report.v2.docx",
        "files": [a, junk, b],
        "ignored": true,
    });
    let request: MergeRequest = serde_json::from_value(body).unwrap();

    let service = Arc::new(MergeService::new(
        &config(base.path()),
        Arc::new(ConcatMerger),
    ));
    let response = service
        .merge_to_url_async(request.clone(), CancelToken::new())
        .await
        .unwrap();

    let prefix = "https://docs.example.org/staging/nga_";
    assert!(response.url.starts_with(prefix), "{}", response.url);
    assert!(response.url.ends_with("/Quarterly%20Report.pdf"), "{}", response.url);

    let staged: Vec<_> = std::fs::read_dir(base.path().join("staging"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(staged.len(), 1);
    let merged = staged[0].join("Quarterly Report.pdf");
    assert_eq!(std::fs::read(&merged).unwrap(), b"%PDF-A|%PDF-B|");

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, serde_json::json!({ "url": response.url }));

    let records: Vec<_> = std::fs::read_dir(base.path().join("archive"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(records.len(), 1);
    let archived: MergeRequest =
        serde_json::from_str(&std::fs::read_to_string(&records[0]).unwrap()).unwrap();
    assert_eq!(archived, request);
}

#[tokio::test]
async fn rejected_request_yields_error_body() {
    let inputs = tempdir().unwrap();
    let base = tempdir().unwrap();
    let junk = write_input(inputs.path(), "notes.txt", b"plain text");

    let service = Arc::new(MergeService::new(
        &config(base.path()),
        Arc::new(ConcatMerger),
    ));
    let err = service
        .merge_to_url_async(MergeRequest::new([junk]), CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MergeError::InsufficientValidInput { invalid: 1 }));
    assert!(!base.path().join("staging").exists());

    let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
    assert!(body["error"].as_str().unwrap().contains("Processing will not continue"));
}

#[test]
fn download_variant_returns_attachment() {
    let inputs = tempdir().unwrap();
    let base = tempdir().unwrap();
    let a = write_input(inputs.path(), "a.pdf", b"%PDF-A");

    let service = MergeService::new(&config(base.path()), Arc::new(ConcatMerger));
    let artifact = service
        .merge_for_download(
            &MergeRequest::new([a]).with_output_filename("bundle"),
            &CancelToken::new(),
        )
        .unwrap();
    assert_eq!(artifact.file_name, "bundle.pdf");
    assert!(artifact.path.starts_with(base.path().join("staging")));
    assert_eq!(
        artifact.content_disposition(),
        "attachment; filename=\"bundle.pdf\""
    );
}
