//! Publishing the output tree.
//!
//! Publish commits whatever the last build produced and pushes it to the
//! hosting branch. The commit is skipped when the build changed nothing,
//! so re-running a deploy on an unchanged site succeeds without creating
//! an empty commit. The push still runs then: it delivers a commit
//! stranded by an earlier failed push, and is a no-op for an up-to-date
//! branch. A repository without any commit has nothing to push at all.

use crate::{log, pipeline::Vcs, utils::date::format_timestamp};
use anyhow::Result;
use chrono::{DateTime, Utc};

/// What a successful publish did to the output tree's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new commit was created and pushed.
    Committed,
    /// Nothing was staged; the branch was pushed as-is.
    Unchanged,
    /// Nothing was staged and the repository has no commits; no push.
    Empty,
}

/// Build the publish commit message, e.g. `Rebuild site (2013-11-19T14:32:05+0000)`.
pub fn commit_message(prefix: &str, time: DateTime<Utc>) -> String {
    format!("{prefix} ({})", format_timestamp(time))
}

/// Stage, commit (when something changed) and push the output tree.
pub fn publish<V: Vcs + ?Sized>(vcs: &mut V, message: &str) -> Result<PublishOutcome> {
    vcs.enter()?;
    vcs.stage_all()?;

    let outcome = if vcs.has_staged_changes()? {
        vcs.commit(message)?;
        log!("deploy"; "{message}");
        PublishOutcome::Committed
    } else if vcs.has_history()? {
        log!("deploy"; "nothing to commit, output unchanged");
        PublishOutcome::Unchanged
    } else {
        log!("deploy"; "nothing to publish, output tree is empty");
        return Ok(PublishOutcome::Empty);
    };

    vcs.push()?;
    Ok(outcome)
}
