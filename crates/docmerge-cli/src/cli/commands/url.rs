//! `docmerge url` – print the public URL for a staged path.

use anyhow::Result;
use docmerge_core::url_translator::UrlTranslator;
use docmerge_core::MergeConfig;
use std::path::Path;

pub fn run_url(cfg: &MergeConfig, path: &Path) -> Result<()> {
    let translator = UrlTranslator::from_config(cfg)?;
    println!("{}", translator.to_url(&path.to_string_lossy())?);
    Ok(())
}
