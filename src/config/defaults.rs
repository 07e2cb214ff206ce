//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn output() -> PathBuf {
        "_site".into()
    }
}

// ============================================================================
// [generator] Section Defaults
// ============================================================================

pub mod generator {
    pub fn command() -> Vec<String> {
        vec!["jekyll".into()]
    }

    pub fn serve_args() -> Vec<String> {
        vec!["--server".into()]
    }
}

// ============================================================================
// [deploy] Section Defaults
// ============================================================================

pub mod deploy {
    pub fn remote() -> String {
        "origin".into()
    }

    pub fn branch() -> String {
        "master".into()
    }

    pub fn message() -> String {
        "Rebuild site".into()
    }
}
