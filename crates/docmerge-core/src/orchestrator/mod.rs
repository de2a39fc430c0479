//! Merge orchestration: validate → allocate staging → merge → publish.
//!
//! Every request moves through [`MergeStage`] in order; a failure at any stage
//! ends the request with a [`MergeError`]. Validation and allocation failures
//! happen before the merge backend runs, so they never leave an artifact.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::MergeConfig;
use crate::control::CancelToken;
use crate::error::MergeError;
use crate::filename::OutputNamer;
use crate::merger::{DocumentMerger, InputDocument, MergerError};
use crate::request::MergeRequest;
use crate::resolver::PathResolver;
use crate::staging::{StagingAreaAllocator, StagingLocation};
use crate::storage::PendingArtifact;
use crate::validator::{InputValidator, ValidatedInput};

/// Progress of a single request through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStage {
    Received,
    Validated,
    StagingAllocated,
    Merging,
    Completed,
}

impl fmt::Display for MergeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MergeStage::Received => "received",
            MergeStage::Validated => "validated",
            MergeStage::StagingAllocated => "staging_allocated",
            MergeStage::Merging => "merging",
            MergeStage::Completed => "completed",
        };
        f.write_str(s)
    }
}

pub struct MergeOrchestrator {
    validator: InputValidator,
    allocator: StagingAreaAllocator,
    namer: OutputNamer,
    merger: Arc<dyn DocumentMerger>,
}

impl MergeOrchestrator {
    pub fn new(
        resolver: PathResolver,
        allocator: StagingAreaAllocator,
        namer: OutputNamer,
        merger: Arc<dyn DocumentMerger>,
    ) -> Self {
        Self {
            validator: InputValidator::new(resolver, Arc::clone(&merger)),
            allocator,
            namer,
            merger,
        }
    }

    pub fn from_config(cfg: &MergeConfig, merger: Arc<dyn DocumentMerger>) -> Self {
        Self::new(
            PathResolver::new(cfg.mounts.clone()),
            StagingAreaAllocator::from_config(cfg),
            OutputNamer::from_config(cfg),
            merger,
        )
    }

    pub fn allocator(&self) -> &StagingAreaAllocator {
        &self.allocator
    }

    pub fn merge(&self, request: &MergeRequest) -> Result<PathBuf, MergeError> {
        self.merge_with_cancel(request, &CancelToken::new())
    }

    /// Run the pipeline for one request, returning the path of the merged document.
    ///
    /// `cancel` is checked before each stage and once more after the merge
    /// backend returns. Cancellation after a staging directory exists removes
    /// that directory.
    pub fn merge_with_cancel(
        &self,
        request: &MergeRequest,
        cancel: &CancelToken,
    ) -> Result<PathBuf, MergeError> {
        let started = Instant::now();
        let mut stage = MergeStage::Received;
        let result = self.run(request, cancel, &mut stage);

        match &result {
            Ok(path) => tracing::info!(
                output = %path.display(),
                inputs = request.files.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "merge completed"
            ),
            Err(e) => tracing::error!(stage = %stage, "merge failed: {}", e),
        }
        result
    }

    fn run(
        &self,
        request: &MergeRequest,
        cancel: &CancelToken,
        stage: &mut MergeStage,
    ) -> Result<PathBuf, MergeError> {
        if request.files.is_empty() {
            return Err(MergeError::NoInputFiles);
        }
        check_cancel(cancel)?;

        let outcome = self.validator.validate(&request.files);
        *stage = MergeStage::Validated;
        if outcome.valid.is_empty() {
            return Err(MergeError::InsufficientValidInput {
                invalid: outcome.invalid_count,
            });
        }
        check_cancel(cancel)?;

        let staging = self.allocator.allocate()?;
        *stage = MergeStage::StagingAllocated;

        let result = self.merge_into(&staging, request, outcome.valid, cancel, stage);
        if matches!(result, Err(MergeError::Cancelled)) {
            discard_staging(&staging);
        }
        result
    }

    fn merge_into(
        &self,
        staging: &StagingLocation,
        request: &MergeRequest,
        valid: Vec<ValidatedInput>,
        cancel: &CancelToken,
        stage: &mut MergeStage,
    ) -> Result<PathBuf, MergeError> {
        check_cancel(cancel)?;

        let filename = self.namer.output_filename(request.output_filename.as_deref());
        let pending = PendingArtifact::new(staging.join(&filename));

        let mut inputs = valid
            .into_iter()
            .map(|v| InputDocument::open(v.location, v.path))
            .collect::<Result<Vec<_>, _>>()
            .map_err(MergeError::MergeExecution)?;

        *stage = MergeStage::Merging;
        tracing::info!(
            "merging {} input(s) into {}",
            inputs.len(),
            pending.final_path().display()
        );
        let started = Instant::now();
        self.merger
            .merge(&mut inputs, pending.temp_path())
            .map_err(MergeError::MergeExecution)?;
        drop(inputs);
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "merge backend finished"
        );

        check_cancel(cancel)?;

        let final_path = pending.final_path().to_path_buf();
        let path = pending
            .finalize()
            .map_err(|e| MergeError::MergeExecution(MergerError::io(final_path, e)))?;
        *stage = MergeStage::Completed;
        Ok(path)
    }
}

fn check_cancel(cancel: &CancelToken) -> Result<(), MergeError> {
    if cancel.is_cancelled() {
        Err(MergeError::Cancelled)
    } else {
        Ok(())
    }
}

fn discard_staging(staging: &StagingLocation) {
    match staging.remove() {
        Ok(()) => tracing::info!(path = %staging.path().display(), "removed staging directory of cancelled request"),
        Err(e) => tracing::warn!(
            path = %staging.path().display(),
            "failed to remove staging directory of cancelled request: {}",
            e
        ),
    }
}
