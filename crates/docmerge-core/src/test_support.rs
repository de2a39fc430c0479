//! Merge backends and fixtures shared by unit tests.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::control::CancelToken;
use crate::merger::{DocumentMerger, InputDocument, MergerError};

pub(crate) const HEADER: &[u8] = b"%PDF";

fn probe_header(path: &Path) -> Result<(), MergerError> {
    let mut head = [0u8; 4];
    let mut f = fs::File::open(path).map_err(|e| MergerError::io(path, e))?;
    f.read_exact(&mut head).map_err(|e| MergerError::io(path, e))?;
    if head == HEADER {
        Ok(())
    } else {
        Err(MergerError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "missing %PDF header".into(),
        })
    }
}

/// Accepts `%PDF`-prefixed files and concatenates their bytes.
#[derive(Default)]
pub(crate) struct ConcatMerger {
    pub(crate) calls: Mutex<Vec<Vec<String>>>,
}

impl ConcatMerger {
    pub(crate) fn merged_locations(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl DocumentMerger for ConcatMerger {
    fn probe(&self, path: &Path) -> Result<(), MergerError> {
        probe_header(path)
    }

    fn merge(&self, inputs: &mut [InputDocument], destination: &Path) -> Result<(), MergerError> {
        let mut out = fs::File::create(destination).map_err(|e| MergerError::io(destination, e))?;
        let mut locations = Vec::new();
        for input in inputs.iter_mut() {
            let mut buf = Vec::new();
            let path = input.path().to_path_buf();
            input
                .file_mut()
                .read_to_end(&mut buf)
                .map_err(|e| MergerError::io(&path, e))?;
            out.write_all(&buf).map_err(|e| MergerError::io(destination, e))?;
            locations.push(input.location().to_string());
        }
        self.calls.lock().unwrap().push(locations);
        Ok(())
    }
}

/// Writes part of the output, then fails.
pub(crate) struct FailingMerger;

impl DocumentMerger for FailingMerger {
    fn probe(&self, path: &Path) -> Result<(), MergerError> {
        probe_header(path)
    }

    fn merge(&self, _inputs: &mut [InputDocument], destination: &Path) -> Result<(), MergerError> {
        fs::write(destination, b"%PDF-1.7 truncated").map_err(|e| MergerError::io(destination, e))?;
        Err(MergerError::Tool("out of memory while merging".into()))
    }
}

/// Completes the merge but flips the cancel token while doing so.
pub(crate) struct CancellingMerger {
    pub(crate) token: CancelToken,
}

impl DocumentMerger for CancellingMerger {
    fn probe(&self, path: &Path) -> Result<(), MergerError> {
        probe_header(path)
    }

    fn merge(&self, inputs: &mut [InputDocument], destination: &Path) -> Result<(), MergerError> {
        ConcatMerger::default().merge(inputs, destination)?;
        self.token.cancel();
        Ok(())
    }
}

/// Write a file and return its path as a location string.
pub(crate) fn write_input(dir: &Path, name: &str, body: &[u8]) -> String {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}
