//! Project configuration from `sitepush.toml`.
//!
//! # Sections
//!
//! | Section       | Purpose                                        |
//! |---------------|------------------------------------------------|
//! | `[build]`     | Output tree location                           |
//! | `[generator]` | External generator command and serve arguments |
//! | `[deploy]`    | Remote, hosting branch, commit message prefix  |
//!
//! The file is optional: without it every field takes its default and the
//! pipeline behaves like the classic `make` / `make serve` / `make deploy`
//! trio around `jekyll`.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "_site"
//!
//! [generator]
//! command = ["jekyll"]
//! serve_args = ["--server"]
//!
//! [deploy]
//! remote = "origin"
//! branch = "master"
//! ```

mod build;
pub mod defaults;
mod deploy;
mod error;
mod generator;

use build::BuildConfig;
use deploy::DeployConfig;
use error::ConfigError;
use generator::GeneratorConfig;

use crate::{
    cli::{Cli, Commands, DEFAULT_CONFIG},
    log,
};
use anyhow::Result;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing sitepush.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Project root holding the content tree (set after loading)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// External generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Publish settings
    #[serde(default)]
    pub deploy: DeployConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config for a CLI invocation and apply its overrides.
    ///
    /// A missing `sitepush.toml` is not an error; defaults are used
    /// instead. A config file named with `-C` must exist.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli
            .root
            .as_deref()
            .map_or_else(|| PathBuf::from("./"), expand_tilde);
        let config_path = root.join(&cli.config);

        let mut config = if config_path.is_file() || cli.config != Path::new(DEFAULT_CONFIG) {
            Self::from_path(&config_path)?
        } else {
            log!("config"; "{} not found, using defaults", cli.config.display());
            Self::default()
        };
        config.update_with_cli(cli, &root);
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Update configuration with CLI arguments and normalize all paths.
    pub fn update_with_cli(&mut self, cli: &Cli, root: &Path) {
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        if let Some(Commands::Deploy { force }) = &cli.command {
            Self::update_option(&mut self.deploy.force, force.as_ref());
        }

        self.root = normalize_path(root);
        self.config_path = normalize_path(&self.root.join(&cli.config));
        self.build.output = normalize_path(&self.root.join(expand_tilde(&self.build.output)));
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate configuration for the given command.
    ///
    /// Checks field values first, then that the external tools the
    /// command needs are on `PATH`.
    pub fn validate(&self, command: &Commands) -> Result<()> {
        self.validate_fields()?;

        if let Some(program) = self.generator.command.first() {
            check_command_installed(program)?;
        }
        if matches!(command, Commands::Deploy { .. }) {
            check_command_installed("git")?;
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<(), ConfigError> {
        if self.generator.command.is_empty() {
            return Err(ConfigError::Validation(
                "[generator.command] must have at least one element".into(),
            ));
        }
        if self.deploy.remote.trim().is_empty() {
            return Err(ConfigError::Validation("[deploy.remote] must not be empty".into()));
        }
        if self.deploy.branch.trim().is_empty() {
            return Err(ConfigError::Validation("[deploy.branch] must not be empty".into()));
        }
        if self.build.output == self.root {
            return Err(ConfigError::Validation(
                "[build.output] must be a directory below the project root".into(),
            ));
        }
        Ok(())
    }
}

/// Check if a command is installed and available
fn check_command_installed(program: &str) -> Result<(), ConfigError> {
    which::which(program).map_err(|err| ConfigError::ToolMissing(program.to_owned(), err))?;
    Ok(())
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Normalize a path to absolute, using canonicalize if the path exists
fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
