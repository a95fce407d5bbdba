use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Exit code recorded when a child is killed after exceeding its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code recorded when the toolchain program could not be started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Toolchain that owns a project directory, decided by its marker files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Python,
    Node,
    Go,
    Rust,
    Unknown,
}

impl ProjectKind {
    /// Recognized kinds in classification order. A directory carrying markers
    /// for several ecosystems belongs to the first kind listed here.
    pub const PRECEDENCE: [ProjectKind; 4] = [
        ProjectKind::Python,
        ProjectKind::Node,
        ProjectKind::Go,
        ProjectKind::Rust,
    ];

    /// Marker files identifying this kind, checked in order.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            ProjectKind::Python => &["pyproject.toml", "setup.py", "setup.cfg", "requirements.txt"],
            ProjectKind::Node => &["package.json"],
            ProjectKind::Go => &["go.mod"],
            ProjectKind::Rust => &["Cargo.toml"],
            ProjectKind::Unknown => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Python => "python",
            ProjectKind::Node => "node",
            ProjectKind::Go => "go",
            ProjectKind::Rust => "rust",
            ProjectKind::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ProjectKind::Unknown)
    }

    /// Classify a directory, returning the winning kind and the marker that matched.
    pub fn detect(dir: &Path) -> Option<(ProjectKind, &'static str)> {
        Self::PRECEDENCE.into_iter().find_map(|kind| {
            kind.markers()
                .iter()
                .find(|marker| dir.join(marker).is_file())
                .map(|marker| (kind, *marker))
        })
    }

    pub fn classify(dir: &Path) -> ProjectKind {
        Self::detect(dir)
            .map(|(kind, _)| kind)
            .unwrap_or(ProjectKind::Unknown)
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a toolchain is asked to do inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Run the project's test suite
    Test,
    /// Install or fetch the project's dependencies
    Install,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Test => "test",
            Task::Install => "install",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A program plus its arguments, resolved for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from an argv-style list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }
}

/// Shell-style single quoting for words that would not read back as one word.
fn quoted(word: &str) -> std::borrow::Cow<'_, str> {
    if !word.is_empty() && !word.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return word.into();
    }
    format!("'{}'", word.replace('\'', r"'\''")).into()
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quoted(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quoted(arg))?;
        }
        Ok(())
    }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitOutcome {
    pub code: i32,
    pub timed_out: bool,
    pub duration: Duration,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.code == 0 && !self.timed_out
    }
}
