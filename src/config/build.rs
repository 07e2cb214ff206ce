//! `[build]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in sitepush.toml - where the generator writes.
///
/// # Example
/// ```toml
/// [build]
/// output = "public"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Output tree, relative to the project root. Must be a git working
    /// tree of its own for `deploy`.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(config.build.output, PathBuf::from("_site"));
    }

    #[test]
    fn test_build_config_output() {
        let config: SiteConfig = toml::from_str(
            r#"
            [build]
            output = "public"
        "#,
        )
        .unwrap();
        assert_eq!(config.build.output, PathBuf::from("public"));
    }

    #[test]
    fn test_build_config_unknown_field_rejection() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
            [build]
            content = "posts"
        "#,
        );
        assert!(result.is_err());
    }
}
