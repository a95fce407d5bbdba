//! Per-project toolchain dispatch.
//!
//! The dispatcher hands each [`ProjectEntry`] to the toolchain registered for
//! its kind and turns the outcome into a [`RunResult`]. A project that fails,
//! times out, or cannot even start is recorded and the remaining projects
//! still run. Nothing is retried.

use crate::discovery::ProjectEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use toolchain::{ExitOutcome, Task, ToolchainRegistry, SPAWN_FAILURE_EXIT_CODE};
use tracing::{debug, error, info, warn};

/// Outcome of running one project's toolchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub project: ProjectEntry,
    /// Literal child exit code, or a synthetic code when the child produced none
    pub exit_code: i32,
    pub duration: Duration,
    pub timed_out: bool,
    /// Why the toolchain could not be started, if it could not
    pub error: Option<String>,
}

impl RunResult {
    pub fn from_outcome(project: ProjectEntry, outcome: ExitOutcome) -> Self {
        Self {
            project,
            exit_code: outcome.code,
            duration: outcome.duration,
            timed_out: outcome.timed_out,
            error: None,
        }
    }

    pub fn not_started(project: ProjectEntry, duration: Duration, reason: String) -> Self {
        Self {
            project,
            exit_code: SPAWN_FAILURE_EXIT_CODE,
            duration,
            timed_out: false,
            error: Some(reason),
        }
    }

    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

pub struct Dispatcher {
    registry: Arc<ToolchainRegistry>,
    task: Task,
    jobs: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolchainRegistry>, task: Task) -> Self {
        Self {
            registry,
            task,
            jobs: 1,
        }
    }

    /// Allow up to `jobs` projects to run at once. Values below 1 mean 1.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Whether a toolchain is registered for the entry's kind.
    pub fn handles(&self, entry: &ProjectEntry) -> bool {
        self.registry.get(entry.kind).is_some()
    }

    /// Run one project. Returns `None` when no toolchain serves its kind.
    pub async fn dispatch_one(&self, entry: &ProjectEntry) -> Option<RunResult> {
        run_entry(&self.registry, self.task, entry).await
    }

    /// Run every entry, returning results in the order the entries were given.
    pub async fn dispatch_all(&self, entries: Vec<ProjectEntry>) -> Vec<RunResult> {
        if self.jobs <= 1 || entries.len() <= 1 {
            let mut results = Vec::with_capacity(entries.len());
            for entry in &entries {
                if let Some(result) = self.dispatch_one(entry).await {
                    results.push(result);
                }
            }
            return results;
        }

        self.dispatch_parallel(entries).await
    }

    async fn dispatch_parallel(&self, entries: Vec<ProjectEntry>) -> Vec<RunResult> {
        debug!(
            "Dispatching {} projects with up to {} jobs",
            entries.len(),
            self.jobs
        );

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut set = JoinSet::new();

        for (index, entry) in entries.iter().cloned().enumerate() {
            let registry = Arc::clone(&self.registry);
            let semaphore = Arc::clone(&semaphore);
            let task = self.task;
            set.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail
                let _permit = semaphore.acquire_owned().await.ok();
                (index, run_entry(&registry, task, &entry).await)
            });
        }

        let mut slots: Vec<Option<Option<RunResult>>> = vec![None; entries.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!("Dispatch task aborted: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(entries)
            .filter_map(|(slot, entry)| match slot {
                Some(result) => result,
                None if self.handles(&entry) => Some(RunResult::not_started(
                    entry,
                    Duration::ZERO,
                    "dispatch task aborted".to_string(),
                )),
                None => None,
            })
            .collect()
    }
}

async fn run_entry(
    registry: &ToolchainRegistry,
    task: Task,
    entry: &ProjectEntry,
) -> Option<RunResult> {
    let Some(toolchain) = registry.get(entry.kind) else {
        debug!("No toolchain for {} ({}), skipping", entry.name, entry.kind);
        return None;
    };

    info!("Running {} for {} ({})", task, entry.name, toolchain.name());
    let started = Instant::now();

    let result = match toolchain.run(task, &entry.path).await {
        Ok(outcome) => RunResult::from_outcome(entry.clone(), outcome),
        Err(e) => {
            error!("Could not start {} for {}: {}", task, entry.name, e);
            RunResult::not_started(entry.clone(), started.elapsed(), e.to_string())
        }
    };

    if result.passed() {
        info!("{} passed in {:.2?}", entry.name, result.duration);
    } else if result.timed_out {
        warn!("{} timed out after {:.2?}", entry.name, result.duration);
    } else {
        warn!("{} failed with exit code {}", entry.name, result.exit_code);
    }

    Some(result)
}
