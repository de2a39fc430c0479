//! `docmerge config` – show where configuration lives and what is in effect.

use anyhow::{Context, Result};
use docmerge_core::MergeConfig;
use std::path::Path;

pub fn run_config(cfg: &MergeConfig, path: &Path) -> Result<()> {
    println!("{}", describe(cfg, path)?);
    Ok(())
}

pub(crate) fn describe(cfg: &MergeConfig, path: &Path) -> Result<String> {
    let toml = toml::to_string_pretty(cfg).context("serialize config")?;
    let status = match cfg.validate() {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("invalid: {e}"),
    };
    Ok(format!("# {}\n# status: {}\n{}", path.display(), status, toml))
}
