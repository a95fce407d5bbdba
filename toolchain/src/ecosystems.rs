//! One [`Toolchain`] implementation per supported ecosystem.
//!
//! Each knows its default test and install commands and honours the command
//! overrides from [`ToolchainConfig`].

use crate::config::{CommandOverrides, ToolchainConfig};
use crate::process::ExecOptions;
use crate::provider::{Toolchain, ToolchainError, ToolchainResult};
use crate::types::{CommandLine, ProjectKind, Task};
use async_trait::async_trait;
use std::path::Path;

fn resolve(
    kind: ProjectKind,
    task: Task,
    overrides: &CommandOverrides,
    default: impl FnOnce() -> CommandLine,
) -> ToolchainResult<CommandLine> {
    match overrides.get(task) {
        Some(argv) => CommandLine::from_argv(argv).ok_or(ToolchainError::EmptyCommand { kind, task }),
        None => Ok(default()),
    }
}

/// `pytest`, and `pip` for dependencies.
pub struct PythonToolchain {
    overrides: CommandOverrides,
    options: ExecOptions,
}

impl PythonToolchain {
    pub fn new(config: &ToolchainConfig) -> Self {
        Self {
            overrides: config.python.clone(),
            options: config.exec_options(),
        }
    }
}

#[async_trait]
impl Toolchain for PythonToolchain {
    fn kind(&self) -> ProjectKind {
        ProjectKind::Python
    }

    fn command(&self, task: Task, dir: &Path) -> ToolchainResult<CommandLine> {
        resolve(self.kind(), task, &self.overrides, || match task {
            Task::Test => CommandLine::new("pytest", Vec::<String>::new()),
            // A bare requirements file has nothing to install in editable mode
            Task::Install if dir.join("requirements.txt").is_file() => {
                CommandLine::new("pip", ["install", "-r", "requirements.txt"])
            }
            Task::Install => CommandLine::new("pip", ["install", "-e", "."]),
        })
    }

    fn exec_options(&self) -> ExecOptions {
        self.options
    }
}

/// `npm`.
pub struct NodeToolchain {
    overrides: CommandOverrides,
    options: ExecOptions,
}

impl NodeToolchain {
    pub fn new(config: &ToolchainConfig) -> Self {
        Self {
            overrides: config.node.clone(),
            options: config.exec_options(),
        }
    }
}

#[async_trait]
impl Toolchain for NodeToolchain {
    fn kind(&self) -> ProjectKind {
        ProjectKind::Node
    }

    fn command(&self, task: Task, dir: &Path) -> ToolchainResult<CommandLine> {
        resolve(self.kind(), task, &self.overrides, || match task {
            Task::Test => CommandLine::new("npm", ["test"]),
            Task::Install if dir.join("package-lock.json").is_file() => {
                CommandLine::new("npm", ["ci"])
            }
            Task::Install => CommandLine::new("npm", ["install"]),
        })
    }

    fn exec_options(&self) -> ExecOptions {
        self.options
    }
}

/// The `go` command.
pub struct GoToolchain {
    overrides: CommandOverrides,
    options: ExecOptions,
}

impl GoToolchain {
    pub fn new(config: &ToolchainConfig) -> Self {
        Self {
            overrides: config.go.clone(),
            options: config.exec_options(),
        }
    }
}

#[async_trait]
impl Toolchain for GoToolchain {
    fn kind(&self) -> ProjectKind {
        ProjectKind::Go
    }

    fn command(&self, task: Task, _dir: &Path) -> ToolchainResult<CommandLine> {
        resolve(self.kind(), task, &self.overrides, || match task {
            Task::Test => CommandLine::new("go", ["test", "./..."]),
            Task::Install => CommandLine::new("go", ["mod", "download"]),
        })
    }

    fn exec_options(&self) -> ExecOptions {
        self.options
    }
}

/// `cargo`.
pub struct RustToolchain {
    overrides: CommandOverrides,
    options: ExecOptions,
}

impl RustToolchain {
    pub fn new(config: &ToolchainConfig) -> Self {
        Self {
            overrides: config.rust.clone(),
            options: config.exec_options(),
        }
    }
}

#[async_trait]
impl Toolchain for RustToolchain {
    fn kind(&self) -> ProjectKind {
        ProjectKind::Rust
    }

    fn command(&self, task: Task, _dir: &Path) -> ToolchainResult<CommandLine> {
        resolve(self.kind(), task, &self.overrides, || match task {
            Task::Test => CommandLine::new("cargo", ["test"]),
            Task::Install => CommandLine::new("cargo", ["fetch"]),
        })
    }

    fn exec_options(&self) -> ExecOptions {
        self.options
    }
}
