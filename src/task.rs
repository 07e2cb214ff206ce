//! Pipeline tasks and their dependency graph.
//!
//! Each stage of the pipeline is a [`Task`] with a declared list of
//! dependencies. [`TaskGraph::plan`] turns the tasks a command asks for
//! into an execution order where every dependency runs first:
//!
//! ```text
//! build   ──► [Generate]
//! serve   ──► [Serve]
//! deploy  ──► [Generate, Publish]     (Publish depends on Generate)
//! ```

use std::{collections::HashMap, fmt};
use thiserror::Error;

/// A unit of work in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Run the external generator to rebuild the output tree.
    Generate,
    /// Run the generator's preview server in the foreground.
    Serve,
    /// Commit and push the output tree to the hosting branch.
    Publish,
}

impl Task {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Serve => "serve",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Task dependency cycle: {}", format_cycle(.0))]
    Cycle(Vec<Task>),
}

fn format_cycle(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|task| task.name())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Declared dependencies between tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    deps: HashMap<Task, Vec<Task>>,
}

impl TaskGraph {
    /// The build/serve/deploy graph: Publish depends on Generate.
    pub fn standard() -> Self {
        Self::default().depend(Task::Publish, Task::Generate)
    }

    /// Declare that `task` requires `on` to have completed first.
    pub fn depend(mut self, task: Task, on: Task) -> Self {
        let deps = self.deps.entry(task).or_default();
        if !deps.contains(&on) {
            deps.push(on);
        }
        self
    }

    /// Direct dependencies of `task`, in declaration order.
    pub fn deps(&self, task: Task) -> &[Task] {
        self.deps.get(&task).map(Vec::as_slice).unwrap_or_default()
    }

    /// Order `targets` and everything they depend on so that each task
    /// comes after its dependencies. Every task appears once.
    pub fn plan(&self, targets: &[Task]) -> Result<Vec<Task>, PlanError> {
        let mut order = Vec::new();
        let mut path = Vec::new();
        for &target in targets {
            self.visit(target, &mut path, &mut order)?;
        }
        Ok(order)
    }

    fn visit(&self, task: Task, path: &mut Vec<Task>, order: &mut Vec<Task>) -> Result<(), PlanError> {
        if order.contains(&task) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|&t| t == task) {
            let mut cycle = path[start..].to_vec();
            cycle.push(task);
            return Err(PlanError::Cycle(cycle));
        }

        path.push(task);
        for &dep in self.deps(task) {
            self.visit(dep, path, order)?;
        }
        path.pop();

        order.push(task);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_deps() {
        let graph = TaskGraph::standard();
        assert_eq!(graph.deps(Task::Publish), &[Task::Generate]);
        assert!(graph.deps(Task::Generate).is_empty());
        assert!(graph.deps(Task::Serve).is_empty());
    }

    #[test]
    fn test_plan_deploy_runs_generate_first() {
        let plan = TaskGraph::standard().plan(&[Task::Publish]).unwrap();
        assert_eq!(plan, vec![Task::Generate, Task::Publish]);
    }

    #[test]
    fn test_plan_build_and_serve() {
        let graph = TaskGraph::standard();
        assert_eq!(graph.plan(&[Task::Generate]).unwrap(), vec![Task::Generate]);
        assert_eq!(graph.plan(&[Task::Serve]).unwrap(), vec![Task::Serve]);
    }

    #[test]
    fn test_plan_deduplicates() {
        let plan = TaskGraph::standard()
            .plan(&[Task::Generate, Task::Publish, Task::Generate])
            .unwrap();
        assert_eq!(plan, vec![Task::Generate, Task::Publish]);
    }

    #[test]
    fn test_plan_empty() {
        assert!(TaskGraph::standard().plan(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_depend_ignores_duplicate_edges() {
        let graph = TaskGraph::standard().depend(Task::Publish, Task::Generate);
        assert_eq!(graph.deps(Task::Publish), &[Task::Generate]);
    }

    #[test]
    fn test_plan_transitive() {
        let graph = TaskGraph::default()
            .depend(Task::Publish, Task::Serve)
            .depend(Task::Serve, Task::Generate);
        let plan = graph.plan(&[Task::Publish]).unwrap();
        assert_eq!(plan, vec![Task::Generate, Task::Serve, Task::Publish]);
    }

    #[test]
    fn test_plan_cycle() {
        let graph = TaskGraph::standard().depend(Task::Generate, Task::Publish);
        let err = graph.plan(&[Task::Publish]).unwrap_err();
        assert_eq!(
            err,
            PlanError::Cycle(vec![Task::Publish, Task::Generate, Task::Publish])
        );
        assert_eq!(
            err.to_string(),
            "Task dependency cycle: publish -> generate -> publish"
        );
    }

    #[test]
    fn test_plan_self_cycle() {
        let graph = TaskGraph::default().depend(Task::Serve, Task::Serve);
        assert!(graph.plan(&[Task::Serve]).is_err());
    }

    #[test]
    fn test_task_display() {
        assert_eq!(Task::Generate.to_string(), "generate");
        assert_eq!(Task::Publish.to_string(), "publish");
    }
}
