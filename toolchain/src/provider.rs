use crate::process::{self, ExecOptions};
use crate::types::{CommandLine, ExitOutcome, ProjectKind, Task};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("No {task} command configured for {kind} projects")]
    EmptyCommand { kind: ProjectKind, task: Task },

    #[error("Failed to spawn '{program}' in {dir}: {reason}")]
    SpawnFailed {
        program: String,
        dir: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ToolchainResult<T> = Result<T, ToolchainError>;

/// An ecosystem's build tool, treated as an opaque collaborator whose only
/// observable contract is the exit code of the command it runs.
#[async_trait]
pub trait Toolchain: Send + Sync {
    fn kind(&self) -> ProjectKind;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Resolve the command line for `task` in the project at `dir`.
    fn command(&self, task: Task, dir: &Path) -> ToolchainResult<CommandLine>;

    fn exec_options(&self) -> ExecOptions {
        ExecOptions::default()
    }

    async fn run(&self, task: Task, dir: &Path) -> ToolchainResult<ExitOutcome> {
        let command = self.command(task, dir)?;
        process::execute(&command, dir, &self.exec_options()).await
    }
}
