//! Local preview through the generator's own server mode.
//!
//! The preview server runs in the foreground with inherited stdio, so its
//! live-reload chatter reaches the terminal as-is. Ctrl+C is delivered to
//! the whole process group: the generator shuts itself down while sitepush
//! only logs and keeps waiting, then exits with the generator's status.

use crate::{
    log,
    utils::exec::{run_foreground, to_cmd_vec},
};
use anyhow::{Context, Result};
use std::{path::Path, sync::OnceLock};

/// Run `command` as the preview server in `root` until it exits.
pub fn serve_site(root: &Path, command: &[String]) -> Result<()> {
    install_interrupt_handler()?;

    log!("serve"; "running `{}`, press Ctrl+C to stop", command.join(" "));
    run_foreground(Some(root), &to_cmd_vec(command), &[])?;
    Ok(())
}

/// Install the Ctrl+C handler once per process.
fn install_interrupt_handler() -> Result<()> {
    static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();

    INSTALLED
        .get_or_init(|| {
            ctrlc::set_handler(|| log!("serve"; "shutting down..."))
                .map_err(|err| err.to_string())
        })
        .clone()
        .map_err(anyhow::Error::msg)
        .context("Failed to set Ctrl+C handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_interrupt_handler_is_idempotent() {
        assert!(install_interrupt_handler().is_ok());
        assert!(install_interrupt_handler().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_serve_site_success() {
        let dir = tempfile::tempdir().unwrap();
        let command = vec!["sh".to_string(), "-c".to_string(), "exit 0".to_string()];
        assert!(serve_site(dir.path(), &command).is_ok());
    }

    #[test]
    fn test_serve_site_empty_command() {
        let dir = tempfile::tempdir().unwrap();
        let err = serve_site(dir.path(), &[]).unwrap_err();
        assert!(err.to_string().contains("No command configured"));
    }
}
