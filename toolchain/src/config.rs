use crate::process::ExecOptions;
use crate::types::{ProjectKind, Task};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-ecosystem command overrides. `None` keeps the ecosystem's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandOverrides {
    pub test: Option<Vec<String>>,
    pub install: Option<Vec<String>>,
}

impl CommandOverrides {
    pub fn get(&self, task: Task) -> Option<&[String]> {
        match task {
            Task::Test => self.test.as_deref(),
            Task::Install => self.install.as_deref(),
        }
    }

    pub fn set(&mut self, task: Task, argv: Vec<String>) {
        match task {
            Task::Test => self.test = Some(argv),
            Task::Install => self.install = Some(argv),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub timeout_secs: Option<u64>,
    pub inherit_output: bool,
    pub python: CommandOverrides,
    pub node: CommandOverrides,
    pub go: CommandOverrides,
    pub rust: CommandOverrides,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            inherit_output: true,
            python: CommandOverrides::default(),
            node: CommandOverrides::default(),
            go: CommandOverrides::default(),
            rust: CommandOverrides::default(),
        }
    }
}

impl ToolchainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn with_inherit_output(mut self, inherit_output: bool) -> Self {
        self.inherit_output = inherit_output;
        self
    }

    /// Replace the command a kind runs for a task. Overrides for
    /// `ProjectKind::Unknown` are ignored.
    pub fn with_command<I, S>(mut self, kind: ProjectKind, task: Task, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(overrides) = self.overrides_mut(kind) {
            overrides.set(task, argv.into_iter().map(Into::into).collect());
        }
        self
    }

    pub fn overrides(&self, kind: ProjectKind) -> Option<&CommandOverrides> {
        match kind {
            ProjectKind::Python => Some(&self.python),
            ProjectKind::Node => Some(&self.node),
            ProjectKind::Go => Some(&self.go),
            ProjectKind::Rust => Some(&self.rust),
            ProjectKind::Unknown => None,
        }
    }

    fn overrides_mut(&mut self, kind: ProjectKind) -> Option<&mut CommandOverrides> {
        match kind {
            ProjectKind::Python => Some(&mut self.python),
            ProjectKind::Node => Some(&mut self.node),
            ProjectKind::Go => Some(&mut self.go),
            ProjectKind::Rust => Some(&mut self.rust),
            ProjectKind::Unknown => None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            timeout: self.timeout(),
            inherit_output: self.inherit_output,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        for kind in ProjectKind::PRECEDENCE {
            let Some(overrides) = self.overrides(kind) else {
                continue;
            };
            for task in [Task::Test, Task::Install] {
                if let Some(argv) = overrides.get(task) {
                    if argv.is_empty() || argv[0].trim().is_empty() {
                        return Err(format!(
                            "{} command for {} projects cannot be empty",
                            task, kind
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
