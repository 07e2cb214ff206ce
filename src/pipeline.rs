//! Build-deploy pipeline runner.
//!
//! The pipeline executes a [`TaskGraph`] plan against three collaborators:
//!
//! - [`SiteGenerator`] runs the external generator (Generate, Serve)
//! - [`Vcs`] stages, commits and pushes the output tree (Publish)
//! - [`Clock`] supplies the publish timestamp
//!
//! Stages run strictly in plan order. The first failure stops the run and
//! comes back as [`PipelineError::Stage`], which remembers the failing task
//! and can recover the exit code of the external command behind it.

use crate::{
    deploy::{commit_message, publish},
    log,
    task::{PlanError, Task, TaskGraph},
    utils::{date::Clock, exec::CommandError},
};
use anyhow::Result;
use thiserror::Error;

/// The external static-site generator.
pub trait SiteGenerator {
    /// Rebuild the output tree from the content tree.
    fn generate(&mut self) -> Result<()>;

    /// Run the preview server until it exits.
    fn serve(&mut self) -> Result<()>;
}

/// Version control over the output tree.
pub trait Vcs {
    /// Check the output tree is a working tree ready to publish from.
    fn enter(&mut self) -> Result<()>;

    /// Stage every added, modified and removed file.
    fn stage_all(&mut self) -> Result<()>;

    /// Whether the index differs from `HEAD`.
    fn has_staged_changes(&mut self) -> Result<bool>;

    /// Whether `HEAD` points at a commit yet.
    fn has_history(&mut self) -> Result<bool>;

    fn commit(&mut self, message: &str) -> Result<()>;

    /// Push the current branch to the hosting branch.
    fn push(&mut self) -> Result<()>;
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("{task} failed: {cause:#}")]
    Stage { task: Task, cause: anyhow::Error },
}

impl PipelineError {
    /// Process exit code for this failure.
    ///
    /// A failed external command keeps its own exit code, and one killed
    /// by a signal reports `128 + signal`. Everything else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Plan(_) => 1,
            Self::Stage { cause, .. } => cause
                .chain()
                .find_map(|err| err.downcast_ref::<CommandError>())
                .and_then(CommandError::code)
                .filter(|&code| code != 0)
                .unwrap_or(1),
        }
    }

    /// The stage that failed, if execution got that far.
    #[cfg(test)]
    pub const fn task(&self) -> Option<Task> {
        match self {
            Self::Plan(_) => None,
            Self::Stage { task, .. } => Some(*task),
        }
    }
}

/// Sequential executor for pipeline tasks.
pub struct Pipeline<G, V, C> {
    graph: TaskGraph,
    generator: G,
    vcs: V,
    clock: C,
    message: String,
}

impl<G: SiteGenerator, V: Vcs, C: Clock> Pipeline<G, V, C> {
    /// Create a pipeline over the standard task graph.
    ///
    /// `message` is the commit message prefix used by Publish.
    pub fn new(generator: G, vcs: V, clock: C, message: impl Into<String>) -> Self {
        Self {
            graph: TaskGraph::standard(),
            generator,
            vcs,
            clock,
            message: message.into(),
        }
    }

    /// Replace the task graph.
    #[cfg(test)]
    pub fn with_graph(mut self, graph: TaskGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Run `targets` and their dependencies, stopping at the first failure.
    pub fn run(&mut self, targets: &[Task]) -> Result<(), PipelineError> {
        let plan = self.graph.plan(targets)?;

        for task in plan {
            log!("pipeline"; "{task}");
            self.run_task(task)
                .map_err(|cause| PipelineError::Stage { task, cause })?;
        }
        Ok(())
    }

    fn run_task(&mut self, task: Task) -> Result<()> {
        match task {
            Task::Generate => self.generator.generate(),
            Task::Serve => self.generator.serve(),
            Task::Publish => {
                let message = commit_message(&self.message, self.clock.now());
                publish(&mut self.vcs, &message).map(|_| ())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
