// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "elevate")]
#[command(about = "In-place edition upgrades for Docker and Kubernetes control planes")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: discover elevate.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new elevate.yml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Serve the upgrade API
    Serve,

    /// Upgrade the local control plane once
    Upgrade {
        /// License key for the target edition
        #[arg(short, long)]
        license: String,
    },

    /// Show the detected platform and local endpoint
    Detect,
}
