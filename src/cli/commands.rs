//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - cycle: run one scheduling cycle against a world snapshot
//! - jobs: list the jobs the businesses would generate
//! - show: print persisted Bosses
//! - reset: clear a colony's persisted Bosses

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mayor - schedules a colony's workers onto prioritized jobs
#[derive(Parser, Debug)]
#[command(name = "mayor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one scheduling cycle and persist the result
    Cycle {
        /// World snapshot file (YAML or JSON)
        #[arg(short, long)]
        world: PathBuf,

        /// Colony room; defaults to the first room in the snapshot
        #[arg(long)]
        colony: Option<String>,

        /// Print the full cycle report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the jobs the colony's businesses would generate
    Jobs {
        /// World snapshot file (YAML or JSON)
        #[arg(short, long)]
        world: PathBuf,

        /// Colony room; defaults to the first room in the snapshot
        #[arg(long)]
        colony: Option<String>,
    },

    /// Show persisted Bosses
    Show {
        /// Only this colony
        #[arg(long)]
        colony: Option<String>,
    },

    /// Clear a colony's persisted Bosses
    Reset {
        /// Colony room to clear
        #[arg(long)]
        colony: String,
    },
}
