//! Command-line front end of the `gvol` binary.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::VolumeConfig;
use crate::fs::HierarchicalFs;
use crate::path::AbstractPath;
use crate::volume::VolumeAdapter;

/// Top-level arguments.
#[derive(Parser)]
#[command(name = "gvol")]
#[command(about = "Inspect file status and data locality on a gluster volume mount", long_about = None)]
pub struct Cli {
    /// Volume configuration file (.toml or .json).
    #[arg(short, long, env = "GVOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Query to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Queries against the volume.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the status of a path.
    Stat { path: String },
    /// Print the statuses of a directory's children, or of a single file.
    Ls { path: String },
    /// Print which hosts hold a byte range of a file.
    Locate {
        path: String,
        #[arg(short, long, default_value = "0")]
        start: u64,
        /// Defaults to the rest of the file.
        #[arg(short, long)]
        len: Option<u64>,
    },
    /// Print the volume identity and mount.
    Describe,
}

impl Cli {
    /// Builds the adapter from `--config`, or from defaults when absent.
    pub fn build_adapter(&self) -> Result<VolumeAdapter> {
        let config = match &self.config {
            Some(path) => VolumeConfig::from_file(path)?,
            None => VolumeConfig::default(),
        };
        Ok(VolumeAdapter::from_config(config)?)
    }

    /// Runs the query and writes its JSON result to `out`.
    pub fn run(&self, adapter: &VolumeAdapter, out: &mut impl Write) -> Result<()> {
        let fs: &dyn HierarchicalFs = adapter;
        match &self.command {
            Command::Stat { path } => {
                let status = fs.file_status(&AbstractPath::parse(path))?;
                serde_json::to_writer_pretty(&mut *out, &status)?;
            }
            Command::Ls { path } => {
                let listing = fs.list_status(&AbstractPath::parse(path))?;
                serde_json::to_writer_pretty(&mut *out, &listing.entries())?;
            }
            Command::Locate { path, start, len } => {
                let status = fs.file_status(&AbstractPath::parse(path))?;
                let len = len.unwrap_or_else(|| status.len.saturating_sub(*start));
                let locality = fs.file_block_locations(&status, *start, len)?;
                serde_json::to_writer_pretty(&mut *out, &locality)?;
            }
            Command::Describe => {
                let summary = serde_json::json!({
                    "uri": fs.uri(),
                    "working_directory": fs.working_directory(),
                    "description": adapter.describe(),
                });
                serde_json::to_writer_pretty(&mut *out, &summary)?;
            }
        }
        writeln!(out)?;
        Ok(())
    }
}
