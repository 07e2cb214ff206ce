//! `[generator]` section configuration.
//!
//! Describes how to invoke the external static-site generator.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[generator]` section in sitepush.toml.
///
/// # Example
/// ```toml
/// [generator]
/// command = ["bundle", "exec", "jekyll", "build"]
/// serve_args = ["serve", "--livereload"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Program and leading arguments run for a build.
    #[serde(default = "defaults::generator::command")]
    #[educe(Default = defaults::generator::command())]
    pub command: Vec<String>,

    /// Arguments appended to `command` to run the preview server.
    #[serde(default = "defaults::generator::serve_args")]
    #[educe(Default = defaults::generator::serve_args())]
    pub serve_args: Vec<String>,
}

impl GeneratorConfig {
    /// Full command line for the preview server.
    pub fn serve_command(&self) -> Vec<String> {
        self.command
            .iter()
            .chain(&self.serve_args)
            .cloned()
            .collect()
    }
}
