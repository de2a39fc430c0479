//! Input validation: keep only the locations the merge backend can open.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::merger::DocumentMerger;
use crate::resolver::PathResolver;

/// An input that resolved and passed the merge backend's probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub location: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Valid inputs, in request order.
    pub valid: Vec<ValidatedInput>,
    pub invalid_count: usize,
}

pub struct InputValidator {
    resolver: PathResolver,
    merger: Arc<dyn DocumentMerger>,
}

impl InputValidator {
    pub fn new(resolver: PathResolver, merger: Arc<dyn DocumentMerger>) -> Self {
        Self { resolver, merger }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Filter `locations` down to the openable ones. A bad location is logged
    /// and dropped, never fatal on its own.
    pub fn validate<S: AsRef<str>>(&self, locations: &[S]) -> ValidationOutcome {
        let started = Instant::now();
        let mut outcome = ValidationOutcome::default();

        for location in locations {
            let location = location.as_ref();
            let path = match self.resolver.resolve(location) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(location, "dropping input: {}", e);
                    outcome.invalid_count += 1;
                    continue;
                }
            };

            let probe_started = Instant::now();
            let result = self.merger.probe(&path);
            tracing::debug!(
                location,
                valid = result.is_ok(),
                elapsed_ms = probe_started.elapsed().as_millis() as u64,
                "probed input"
            );

            match result {
                Ok(()) => outcome.valid.push(ValidatedInput {
                    location: location.to_string(),
                    path,
                }),
                Err(e) => {
                    tracing::warn!(location, "dropping input: {}", e);
                    outcome.invalid_count += 1;
                }
            }
        }

        tracing::debug!(
            valid = outcome.valid.len(),
            invalid = outcome.invalid_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "input validation completed"
        );
        outcome
    }
}
