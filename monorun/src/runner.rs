//! End-to-end run: discover → dispatch → report.

use crate::config::{ConfigError, RunnerConfig};
use crate::discovery::{self, DiscoveryError, ProjectEntry};
use crate::dispatch::Dispatcher;
use crate::report::{ReportError, Reporter, RunReport, EXIT_CONFIG_ERROR, EXIT_FAILURE};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use toolchain::{Task, ToolchainRegistry};
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Configuration error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Stats error: {0}")]
    Stats(#[from] stats::StatsError),
}

impl RunError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Config(_) | RunError::Discovery(_) => EXIT_CONFIG_ERROR,
            RunError::Stats(stats::StatsError::RootMissing(_)) => EXIT_CONFIG_ERROR,
            RunError::Report(_) | RunError::Stats(_) => EXIT_FAILURE,
        }
    }
}

pub type RunnerResult<T> = Result<T, RunError>;

pub struct Runner {
    config: RunnerConfig,
    registry: Arc<ToolchainRegistry>,
}

impl Runner {
    /// Runner using the built-in toolchains configured from `config`.
    pub fn new(config: RunnerConfig) -> Self {
        let registry = ToolchainRegistry::from_config(&config.toolchains);
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: RunnerConfig, registry: ToolchainRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn log_path(&self, task: Task) -> PathBuf {
        self.config.log_path(task)
    }

    /// Validate the configuration and list every project under the root.
    pub fn discover(&self) -> RunnerResult<Vec<ProjectEntry>> {
        self.config.validate()?;
        Ok(discovery::discover(&self.config.root)?.collect())
    }

    /// Discover and dispatch without writing the summary log.
    pub async fn execute(&self, task: Task) -> RunnerResult<RunReport> {
        let entries = self.discover()?;
        let started_at = Utc::now();

        let dispatcher =
            Dispatcher::new(Arc::clone(&self.registry), task).with_jobs(self.config.jobs);

        let (runnable, skipped): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| dispatcher.handles(e));
        for entry in &skipped {
            if entry.kind.is_known() {
                warn!("Skipping {}: no toolchain registered for {}", entry.name, entry.kind);
            } else {
                warn!("Skipping {}: no recognized marker file", entry.name);
            }
        }

        info!(
            "Running {} for {} projects under {}",
            task,
            runnable.len(),
            self.config.root.display()
        );
        let results = dispatcher.dispatch_all(runnable).await;

        Ok(RunReport {
            task,
            results,
            skipped,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Full run: discover, dispatch, and write the summary log.
    pub async fn run(&self, task: Task) -> RunnerResult<RunReport> {
        let report = self.execute(task).await?;
        Reporter::new(&self.config.log_dir).write(&report)?;

        if report.all_passed() {
            info!("{}: all {} projects passed", task, report.results.len());
        } else {
            warn!(
                "{}: {} of {} projects failed",
                task,
                report.failed(),
                report.results.len()
            );
        }
        Ok(report)
    }
}
