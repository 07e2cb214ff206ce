//! Site generation through the external generator.
//!
//! The generator runs with the project root as its working directory and
//! no arguments beyond the configured command, so it picks up its own
//! config file and content tree by convention and rewrites the output
//! tree in full.

use crate::{
    config::SiteConfig,
    exec, log,
    pipeline::SiteGenerator,
    serve::serve_site,
};
use anyhow::Result;
use std::path::PathBuf;

/// [`SiteGenerator`] that shells out to the configured generator command.
#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    root: PathBuf,
    command: Vec<String>,
    serve_command: Vec<String>,
}

impl ExternalGenerator {
    pub fn new(root: impl Into<PathBuf>, command: Vec<String>, serve_command: Vec<String>) -> Self {
        Self {
            root: root.into(),
            command,
            serve_command,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            config.get_root(),
            config.generator.command.clone(),
            config.generator.serve_command(),
        )
    }
}

impl SiteGenerator for ExternalGenerator {
    fn generate(&mut self) -> Result<()> {
        log!("build"; "running `{}`", self.command.join(" "));
        exec!(self.root.as_path(); &self.command;)?;
        log!("build"; "done");
        Ok(())
    }

    fn serve(&mut self) -> Result<()> {
        serve_site(&self.root, &self.serve_command)
    }
}
