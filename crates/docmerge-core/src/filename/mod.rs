//! Output filename derivation.
//!
//! Turns the optional client-supplied name into the final artifact name inside
//! a staging directory, forcing the configured document extension.

mod sanitize;

pub use sanitize::sanitize_output_name;

use sanitize::fit_to_name_max;

/// Derives the artifact filename for a request.
#[derive(Debug, Clone)]
pub struct OutputNamer {
    default_filename: String,
    extension: String,
}

impl OutputNamer {
    pub fn new(default_filename: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            default_filename: default_filename.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(cfg: &crate::config::MergeConfig) -> Self {
        Self::new(&cfg.default_output_filename, &cfg.output_extension)
    }

    /// Name of the merged document.
    ///
    /// - absent/empty → the default filename
    /// - already ending in the extension (any case) → used as is
    /// - otherwise all extensions are dropped and the configured one appended
    /// - a result over 255 bytes loses the end of its stem, never the extension
    ///
    /// # Examples
    ///
    /// - `None` → `"merged.pdf"`
    /// - `Some("report")` → `"report.pdf"`
    /// - `Some("report.v2.docx")` → `"report.pdf"`
    /// - `Some("Report.PDF")` → `"Report.PDF"`
    pub fn output_filename(&self, requested: Option<&str>) -> String {
        let sanitized = requested
            .map(sanitize_output_name)
            .filter(|s| !s.is_empty());

        let Some(name) = sanitized else {
            return self.default_filename.clone();
        };

        if has_extension(&name, &self.extension) {
            let (stem, tail) = name.split_at(name.len() - self.extension.len());
            return fit_to_name_max(stem, tail);
        }

        let stem = remove_extensions(&name);
        if stem.is_empty() {
            return self.default_filename.clone();
        }
        fit_to_name_max(stem, &self.extension)
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.len() > extension.len()
        && name
            .get(name.len() - extension.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(extension))
}

/// Everything before the first `.` (a name without dots is returned whole).
pub fn remove_extensions(name: &str) -> &str {
    match name.find('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}
