//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::task::Task;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Config file looked up in the project root when `-C` is not given.
pub const DEFAULT_CONFIG: &str = "sitepush.toml";

/// Build, preview and publish a generated static site
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root holding the content tree (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: sitepush.toml)
    #[arg(short = 'C', long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// subcommands (default: build)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the site generator to rebuild the output directory
    #[command(alias = "all")]
    Build,

    /// Run the generator's preview server in the foreground
    Serve,

    /// Rebuild the site, then commit and push the output directory
    Deploy {
        /// Force push (overwrites remote history)
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        force: Option<bool>,
    },
}

impl Cli {
    /// The subcommand to run, `build` when none was given.
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Build)
    }
}

impl Commands {
    /// Tasks this command asks for; dependencies are added by planning.
    pub const fn targets(&self) -> &'static [Task] {
        match self {
            Self::Build => &[Task::Generate],
            Self::Serve => &[Task::Serve],
            Self::Deploy { .. } => &[Task::Publish],
        }
    }
}
