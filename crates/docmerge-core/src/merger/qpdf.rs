//! Merge backend that shells out to `qpdf`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{DocumentMerger, InputDocument, MergerError};

/// qpdf exits with 3 when it succeeded but printed warnings.
const EXIT_WARNINGS: i32 = 3;

#[derive(Debug, Clone)]
pub struct QpdfMerger {
    program: PathBuf,
}

impl QpdfMerger {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(cfg: &crate::config::MergerConfig) -> Self {
        Self::new(&cfg.program)
    }

    fn run(&self, args: Vec<OsString>) -> Result<Output, MergerError> {
        Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| MergerError::Tool(format!("failed to run {}: {e}", self.program.display())))
    }
}

fn succeeded(output: &Output) -> bool {
    matches!(output.status.code(), Some(0) | Some(EXIT_WARNINGS))
}

fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let first = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    format!("{} {}", output.status, first.trim())
}

/// File argument that qpdf cannot read as an option (`-x`) or an
/// argument file (`@x`): relative paths are anchored with `./`.
pub(crate) fn operand(path: &Path) -> OsString {
    if path.is_absolute() || path.starts_with(".") || path.starts_with("..") {
        path.as_os_str().to_owned()
    } else {
        Path::new(".").join(path).into_os_string()
    }
}

pub(crate) fn check_args(path: &Path) -> Vec<OsString> {
    vec!["--check".into(), operand(path)]
}

pub(crate) fn merge_args<'a, I>(inputs: I, destination: &Path) -> Vec<OsString>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut args: Vec<OsString> = vec!["--empty".into(), "--pages".into()];
    args.extend(inputs.into_iter().map(operand));
    args.push("--".into());
    args.push(operand(destination));
    args
}

impl DocumentMerger for QpdfMerger {
    fn probe(&self, path: &Path) -> Result<(), MergerError> {
        let output = self.run(check_args(path))?;
        if succeeded(&output) {
            Ok(())
        } else {
            Err(MergerError::InvalidDocument {
                path: path.to_path_buf(),
                reason: failure_reason(&output),
            })
        }
    }

    fn merge(&self, inputs: &mut [InputDocument], destination: &Path) -> Result<(), MergerError> {
        let args = merge_args(inputs.iter().map(|d| d.path()), destination);
        let output = self.run(args)?;
        if succeeded(&output) {
            Ok(())
        } else {
            Err(MergerError::Tool(failure_reason(&output)))
        }
    }
}
