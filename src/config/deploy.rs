//! `[deploy]` section configuration.
//!
//! Where and how the output tree is published.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[deploy]` section in sitepush.toml - publish settings.
///
/// The output tree must already be a git working tree with `remote`
/// configured; sitepush never adds or rewrites remotes.
///
/// # Example
/// ```toml
/// [deploy]
/// remote = "origin"
/// branch = "gh-pages"
/// message = "Rebuild site"
/// force = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Remote name in the output tree.
    #[serde(default = "defaults::deploy::remote")]
    #[educe(Default = defaults::deploy::remote())]
    pub remote: String,

    /// Hosting branch served by the provider.
    #[serde(default = "defaults::deploy::branch")]
    #[educe(Default = defaults::deploy::branch())]
    pub branch: String,

    /// Commit message prefix; the publish timestamp is appended in parentheses.
    #[serde(default = "defaults::deploy::message")]
    #[educe(Default = defaults::deploy::message())]
    pub message: String,

    /// Force push (overwrites remote history).
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub force: bool,
}
