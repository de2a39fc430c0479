//! Merge backend for integration tests: accepts `%PDF`-prefixed files and
//! writes their bytes back to back, so results can be checked byte for byte.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use docmerge_core::merger::{DocumentMerger, InputDocument, MergerError};

pub struct ConcatMerger;

impl DocumentMerger for ConcatMerger {
    fn probe(&self, path: &Path) -> Result<(), MergerError> {
        let bytes = fs::read(path).map_err(|e| MergerError::io(path, e))?;
        if bytes.starts_with(b"%PDF") {
            Ok(())
        } else {
            Err(MergerError::InvalidDocument {
                path: path.to_path_buf(),
                reason: "missing %PDF header".into(),
            })
        }
    }

    fn merge(&self, inputs: &mut [InputDocument], destination: &Path) -> Result<(), MergerError> {
        let mut out = fs::File::create(destination).map_err(|e| MergerError::io(destination, e))?;
        for input in inputs.iter_mut() {
            let path = input.path().to_path_buf();
            let mut buf = Vec::new();
            input
                .file_mut()
                .read_to_end(&mut buf)
                .map_err(|e| MergerError::io(&path, e))?;
            out.write_all(&buf).map_err(|e| MergerError::io(destination, e))?;
        }
        Ok(())
    }
}

/// Write `body` to `dir/name` and return the path as a request location.
pub fn write_input(dir: &Path, name: &str, body: &[u8]) -> String {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}
