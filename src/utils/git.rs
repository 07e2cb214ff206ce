//! Git operations on the output tree.
//!
//! The output tree is its own repository, checked out from the hosting
//! branch. Repository checks go through `gix`; staging, committing and
//! pushing run the `git` CLI inside the output tree so the operator's
//! credential helpers, hooks and config apply unchanged.

use crate::{
    config::SiteConfig,
    exec, log,
    pipeline::Vcs,
    utils::exec::{CommandError, SILENT_FILTER, capture, to_cmd_vec, to_os},
};
use anyhow::{Context, Result, bail};
use gix::Repository;
use std::path::{Path, PathBuf};

/// Open an existing git repository rooted exactly at `root`.
pub fn open_repo(root: &Path) -> Result<Repository> {
    gix::open(root).with_context(|| format!("`{}` is not a git repository", root.display()))
}

/// Check if a remote with the given name is configured
fn remote_exists(repo: &Repository, name: &str) -> bool {
    repo.find_remote(name).is_ok()
}

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    remote: String,
    branch: String,
    force: bool,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>, remote: &str, branch: &str, force: bool) -> Self {
        Self {
            root: root.into(),
            remote: remote.to_owned(),
            branch: branch.to_owned(),
            force,
        }
    }

    /// Publish the configured output tree to `[deploy]` remote and branch.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            &config.build.output,
            &config.deploy.remote,
            &config.deploy.branch,
            config.deploy.force,
        )
    }

    /// Refspec pushing the checked-out commit to the hosting branch.
    fn refspec(&self) -> String {
        format!("HEAD:refs/heads/{}", self.branch)
    }
}

impl Vcs for GitCli {
    fn enter(&mut self) -> Result<()> {
        let repo = open_repo(&self.root)?;
        if repo.is_bare() {
            bail!("`{}` is a bare repository", self.root.display());
        }
        if !remote_exists(&repo, &self.remote) {
            bail!(
                "Remote `{}` is not configured in `{}`",
                self.remote,
                self.root.display()
            );
        }
        Ok(())
    }

    fn stage_all(&mut self) -> Result<()> {
        exec!(filter=&SILENT_FILTER; self.root.as_path(); ["git"]; "add", "--all", ".")?;
        Ok(())
    }

    fn has_staged_changes(&mut self) -> Result<bool> {
        let args = [to_os("diff"), to_os("--cached"), to_os("--quiet")];
        let (name, output) = capture(Some(self.root.as_path()), &to_cmd_vec(["git"]), &args)?;

        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(CommandError::failed(
                name,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            )
            .into()),
        }
    }

    fn has_history(&mut self) -> Result<bool> {
        let repo = open_repo(&self.root)?;
        let head = repo
            .head()
            .with_context(|| format!("Failed to read HEAD in `{}`", self.root.display()))?;
        Ok(!head.is_unborn())
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        exec!(self.root.as_path(); ["git"]; "commit", "--quiet", "-m", message)?;
        Ok(())
    }

    fn push(&mut self) -> Result<()> {
        log!("git"; "pushing to {}/{}", self.remote, self.branch);
        let force = if self.force { "--force" } else { "" };
        exec!(self.root.as_path(); ["git"]; "push", force, &self.remote, self.refspec())
            .with_context(|| format!("Failed to push to {}/{}", self.remote, self.branch))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{PublishOutcome, publish};
    use std::fs;

    fn git(dir: &Path, args: &[&str]) {
        let args: Vec<_> = args.iter().map(|a| to_os(*a)).collect();
        crate::utils::exec::exec(
            Some(dir),
            &to_cmd_vec(["git"]),
            &args,
            &SILENT_FILTER,
        )
        .unwrap();
    }

    /// Output tree with a local bare repository as its `origin`.
    fn output_tree() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let remote = dir.path().join("remote.git");
        let output = dir.path().join("_site");
        fs::create_dir_all(&remote).unwrap();
        fs::create_dir_all(&output).unwrap();

        git(&remote, &["init", "--quiet", "--bare"]);
        git(&output, &["init", "--quiet"]);
        git(&output, &["config", "user.name", "Site Builder"]);
        git(&output, &["config", "user.email", "builder@example.com"]);
        git(&output, &["config", "commit.gpgsign", "false"]);
        git(&output, &["remote", "add", "origin", remote.to_str().unwrap()]);
        (dir, output, remote)
    }

    #[test]
    fn test_refspec() {
        let vcs = GitCli::new("/blog/_site", "origin", "gh-pages", false);
        assert_eq!(vcs.refspec(), "HEAD:refs/heads/gh-pages");
    }

    #[test]
    fn test_from_config() {
        let mut config = SiteConfig::default();
        config.build.output = PathBuf::from("/blog/_site");
        config.deploy.force = true;
        let vcs = GitCli::from_config(&config);

        assert_eq!(vcs.root, PathBuf::from("/blog/_site"));
        assert_eq!(vcs.remote, "origin");
        assert_eq!(vcs.branch, "master");
        assert!(vcs.force);
    }

    #[test]
    fn test_enter_rejects_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut vcs = GitCli::new(dir.path(), "origin", "master", false);
        let err = vcs.enter().unwrap_err();
        assert!(err.to_string().contains("is not a git repository"));
    }

    #[test]
    fn test_enter_rejects_missing_remote() {
        let (_dir, output, _remote) = output_tree();
        let mut vcs = GitCli::new(&output, "upstream", "master", false);
        let err = vcs.enter().unwrap_err();
        assert!(err.to_string().contains("Remote `upstream` is not configured"));
    }

    #[test]
    fn test_publish_round_trip_against_local_remote() {
        let (_dir, output, remote) = output_tree();
        fs::write(output.join("index.html"), "<h1>hello</h1>").unwrap();

        let mut vcs = GitCli::new(&output, "origin", "master", false);
        vcs.enter().unwrap();
        vcs.stage_all().unwrap();
        assert!(vcs.has_staged_changes().unwrap());
        vcs.commit("Rebuild site (2013-11-19T14:32:05+0000)").unwrap();
        vcs.push().unwrap();

        // Nothing changed since the last commit.
        vcs.stage_all().unwrap();
        assert!(!vcs.has_staged_changes().unwrap());
        vcs.push().unwrap();

        let (_, log) = capture(
            Some(remote.as_path()),
            &to_cmd_vec(["git"]),
            &[to_os("log"), to_os("--format=%s"), to_os("master")],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8_lossy(&log.stdout).trim(),
            "Rebuild site (2013-11-19T14:32:05+0000)"
        );
    }

    #[test]
    fn test_publish_empty_output_tree_without_commits() {
        let (_dir, output, remote) = output_tree();
        let mut vcs = GitCli::new(&output, "origin", "master", false);
        assert!(!vcs.has_history().unwrap());

        let outcome = publish(&mut vcs, "Rebuild site (x)").unwrap();

        assert_eq!(outcome, PublishOutcome::Empty);
        let (_, log) = capture(
            Some(remote.as_path()),
            &to_cmd_vec(["git"]),
            &[to_os("rev-parse"), to_os("--verify"), to_os("--quiet"), to_os("master")],
        )
        .unwrap();
        assert!(!log.status.success());
    }

    #[test]
    fn test_has_history_after_first_commit() {
        let (_dir, output, _remote) = output_tree();
        fs::write(output.join("index.html"), "<h1>hello</h1>").unwrap();

        let mut vcs = GitCli::new(&output, "origin", "master", false);
        vcs.stage_all().unwrap();
        vcs.commit("first").unwrap();

        assert!(vcs.has_history().unwrap());
    }

    #[test]
    fn test_staged_removal_is_a_change() {
        let (_dir, output, _remote) = output_tree();
        fs::write(output.join("old.html"), "old").unwrap();

        let mut vcs = GitCli::new(&output, "origin", "master", false);
        vcs.stage_all().unwrap();
        vcs.commit("first").unwrap();

        fs::remove_file(output.join("old.html")).unwrap();
        vcs.stage_all().unwrap();
        assert!(vcs.has_staged_changes().unwrap());
    }
}
