use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for the external merge tool (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergerConfig {
    /// Program used for probing and merging (looked up on `PATH` if relative).
    pub program: String,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            program: "qpdf".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/docmerge/config.toml`.
///
/// Loaded once at startup and treated as read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Directory under which per-request staging directories are created.
    pub staging_root: PathBuf,
    /// Path prefix stripped from staging paths when building URLs.
    pub base_path: String,
    /// Scheme and authority (optionally a path) prepended to translated paths.
    pub base_url: String,
    /// Output filename used when a request does not name one.
    pub default_output_filename: String,
    /// Extension forced onto every output filename.
    pub output_extension: String,
    /// Number of characters in the random part of a staging directory name.
    pub token_length: usize,
    /// First component of every staging directory name.
    pub staging_prefix: String,
    /// Upper bound on name collisions tolerated by the allocator.
    pub max_allocation_attempts: u32,
    /// Directory for request archive records; archiving is disabled when absent.
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
    /// URI scheme -> local mount point (e.g. `s3 = "/mnt/s3"`).
    #[serde(default)]
    pub mounts: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub merger: MergerConfig,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            staging_root: PathBuf::from("/tmp/docmerge/staging"),
            base_path: "/tmp/docmerge".to_string(),
            base_url: "http://localhost/".to_string(),
            default_output_filename: "merged.pdf".to_string(),
            output_extension: ".pdf".to_string(),
            token_length: 8,
            staging_prefix: "merge".to_string(),
            max_allocation_attempts: 16,
            archive_dir: None,
            mounts: BTreeMap::new(),
            merger: MergerConfig::default(),
        }
    }
}

/// Problem found while checking a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("base_url {value:?} is not a valid URL: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("base_url {0:?} has no host")]
    BaseUrlWithoutHost(String),
    #[error("base_path must not be empty")]
    EmptyBasePath,
    #[error("token_length must be between {min} and {max}, got {actual}")]
    TokenLength { min: usize, max: usize, actual: usize },
    #[error("output_extension {0:?} must start with '.' and have at least one more character")]
    Extension(String),
    #[error("max_allocation_attempts must be at least 1")]
    NoAllocationAttempts,
    #[error("default_output_filename must not be empty")]
    EmptyDefaultFilename,
}

pub const MIN_TOKEN_LENGTH: usize = 4;
pub const MAX_TOKEN_LENGTH: usize = 32;

impl MergeConfig {
    /// Check the values that would otherwise only fail once a request arrives.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::BaseUrlWithoutHost(self.base_url.clone()));
        }
        if self.base_path.trim().is_empty() {
            return Err(ConfigError::EmptyBasePath);
        }
        if !(MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&self.token_length) {
            return Err(ConfigError::TokenLength {
                min: MIN_TOKEN_LENGTH,
                max: MAX_TOKEN_LENGTH,
                actual: self.token_length,
            });
        }
        if !self.output_extension.starts_with('.') || self.output_extension.len() < 2 {
            return Err(ConfigError::Extension(self.output_extension.clone()));
        }
        if self.max_allocation_attempts == 0 {
            return Err(ConfigError::NoAllocationAttempts);
        }
        if self.default_output_filename.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultFilename);
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("docmerge")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MergeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MergeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file (no default is written).
pub fn load_from_path(path: &Path) -> Result<MergeConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: MergeConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        staging_root = "/srv/merge/staging"
        base_path = "/srv/merge"
        base_url = "https://docs.example.org/"
        default_output_filename = "combined.pdf"
        output_extension = ".pdf"
        token_length = 8
        staging_prefix = "nga"
        max_allocation_attempts = 4
    "#;

    #[test]
    fn default_config_values() {
        let cfg = MergeConfig::default();
        assert_eq!(cfg.default_output_filename, "merged.pdf");
        assert_eq!(cfg.output_extension, ".pdf");
        assert_eq!(cfg.token_length, 8);
        assert!(cfg.archive_dir.is_none());
        assert!(cfg.mounts.is_empty());
        assert_eq!(cfg.merger.program, "qpdf");
        cfg.validate().unwrap();
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MergeConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MergeConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.staging_root, cfg.staging_root);
        assert_eq!(parsed.base_url, cfg.base_url);
        assert_eq!(parsed.token_length, cfg.token_length);
    }

    #[test]
    fn config_toml_optional_sections_default() {
        let cfg: MergeConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(cfg.staging_prefix, "nga");
        assert_eq!(cfg.max_allocation_attempts, 4);
        assert!(cfg.archive_dir.is_none());
        assert!(cfg.mounts.is_empty());
        assert_eq!(cfg.merger, MergerConfig::default());
    }

    #[test]
    fn config_toml_archive_mounts_and_merger() {
        let toml = format!(
            r#"{MINIMAL}
            archive_dir = "/var/lib/docmerge/requests"

            [mounts]
            s3 = "/mnt/s3"

            [merger]
            program = "/usr/local/bin/qpdf"
            "#
        );
        let cfg: MergeConfig = toml::from_str(&toml).unwrap();
        assert_eq!(
            cfg.archive_dir.as_deref(),
            Some(Path::new("/var/lib/docmerge/requests"))
        );
        assert_eq!(cfg.mounts.get("s3").unwrap(), Path::new("/mnt/s3"));
        assert_eq!(cfg.merger.program, "/usr/local/bin/qpdf");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = MergeConfig::default();
        cfg.base_url = "not a url".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidBaseUrl { .. })));

        let mut cfg = MergeConfig::default();
        cfg.token_length = 2;
        assert!(matches!(cfg.validate(), Err(ConfigError::TokenLength { actual: 2, .. })));

        let mut cfg = MergeConfig::default();
        cfg.output_extension = "pdf".into();
        assert_eq!(cfg.validate(), Err(ConfigError::Extension("pdf".into())));

        let mut cfg = MergeConfig::default();
        cfg.max_allocation_attempts = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NoAllocationAttempts));

        let mut cfg = MergeConfig::default();
        cfg.base_path = " ".into();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyBasePath));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, MINIMAL).unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.base_url, "https://docs.example.org/");
    }

    #[test]
    fn load_from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("read config"));
    }
}
