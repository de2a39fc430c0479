//! CLI for the docmerge pipeline.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docmerge_core::config::{self, MergeConfig};
use std::path::{Path, PathBuf};

use commands::{run_config, run_download, run_merge, run_url};

/// Top-level CLI for docmerge.
#[derive(Debug, Parser)]
#[command(name = "docmerge")]
#[command(about = "docmerge: merge documents into a staged, URL-addressable result", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Merge the given files and print the public URL as JSON.
    Merge {
        /// Suggested output filename (the configured extension is enforced).
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
        /// Input files or URIs, in merge order.
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Merge the given files and copy the result to a local path.
    Download {
        /// Suggested output filename (the configured extension is enforced).
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
        /// Where to write the merged document.
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
        /// Input files or URIs, in merge order.
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Print the public URL for a path under the configured base path.
    Url {
        /// Path of a staged output file.
        path: String,
    },

    /// Show the configuration file location and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let (cfg, cfg_path) = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Merge { name, files } => run_merge(&cfg, name, files).await?,
            CliCommand::Download { name, out, files } => {
                run_download(&cfg, name, files, &out).await?;
            }
            CliCommand::Url { path } => run_url(&cfg, Path::new(&path))?,
            CliCommand::Config => run_config(&cfg, &cfg_path)?,
        }

        Ok(())
    }
}

fn load_config(explicit: Option<&Path>) -> Result<(MergeConfig, PathBuf)> {
    match explicit {
        Some(path) => Ok((config::load_from_path(path)?, path.to_path_buf())),
        None => Ok((config::load_or_init()?, config::config_path()?)),
    }
}

#[cfg(test)]
mod tests;
