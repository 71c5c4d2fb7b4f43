use std::collections::HashSet;
use tokio::task::JoinSet;

use crate::models::Task;
use crate::runner::{self, RunnerContext};
use crate::utils::error::TaskError;

/// How the run ended, per task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub started: usize,
    /// Tasks never started because an earlier task already used the name.
    pub rejected: Vec<String>,
    /// Tasks that stopped with a fatal error.
    pub failed: Vec<String>,
    pub panicked: usize,
}

/// Launches one independent runner per task and waits on all of them.
///
/// Runners never talk to each other; a runner that stops stays stopped.
pub struct Supervisor {
    ctx: RunnerContext,
}

impl Supervisor {
    pub fn new(ctx: RunnerContext) -> Self {
        Self { ctx }
    }

    /// Resolves only once every runner has terminated, which for healthy
    /// tasks is never.
    pub async fn run(&self, tasks: Vec<Task>) -> RunSummary {
        let mut summary = RunSummary::default();
        if tasks.is_empty() {
            tracing::warn!("no tasks configured");
            return summary;
        }

        let mut set = JoinSet::new();
        self.spawn_runners(&mut set, tasks, &mut summary);
        tracing::info!(tasks = summary.started, "all tasks launched");

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(err) => {
                    tracing::error!(task = %err.task(), "task terminated: {}", err);
                    summary.failed.push(err.task().to_string());
                }
                Err(e) if e.is_panic() => {
                    tracing::error!("task panicked: {}", e);
                    summary.panicked += 1;
                }
                Err(e) => {
                    tracing::warn!("task cancelled: {}", e);
                }
            }
        }

        summary
    }

    fn spawn_runners(
        &self,
        set: &mut JoinSet<TaskError>,
        tasks: Vec<Task>,
        summary: &mut RunSummary,
    ) {
        let mut names = HashSet::new();
        for task in tasks {
            // Two runners on one name would race on the same stored record.
            if !names.insert(task.name.clone()) {
                tracing::error!(task = %task.name, "duplicate task name, not starting it");
                summary.rejected.push(task.name);
                continue;
            }

            set.spawn(runner::launch(task, self.ctx.clone()));
            summary.started += 1;
        }
    }
}
