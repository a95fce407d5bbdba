//! Runner configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional `monorun.toml`, and command-line flags ([`Overrides`]).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use toolchain::{Task, ToolchainConfig};

pub const DEFAULT_CONFIG_FILE: &str = "monorun.toml";
pub const DEFAULT_ROOT: &str = "projects";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory whose immediate subdirectories are the projects
    pub root: PathBuf,
    /// Directory receiving the summary log
    pub log_dir: PathBuf,
    /// Maximum number of projects dispatched at once
    pub jobs: usize,
    pub toolchains: ToolchainConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            jobs: 1,
            toolchains: ToolchainConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_toolchains(mut self, toolchains: ToolchainConfig) -> Self {
        self.toolchains = toolchains;
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load an explicitly requested config file, which must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Load `path` if present, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn apply(mut self, overrides: &Overrides) -> Self {
        if let Some(root) = &overrides.root {
            self.root = root.clone();
        }
        if let Some(log_dir) = &overrides.log_dir {
            self.log_dir = log_dir.clone();
        }
        if let Some(jobs) = overrides.jobs {
            self.jobs = jobs;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.toolchains.timeout_secs = Some(secs);
        }
        if overrides.quiet {
            self.toolchains.inherit_output = false;
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.toolchains.timeout()
    }

    pub fn log_path(&self, task: Task) -> PathBuf {
        log_path(&self.log_dir, task)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("Project root cannot be empty".to_string()));
        }

        if self.log_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("Log directory cannot be empty".to_string()));
        }

        if self.jobs == 0 {
            return Err(ConfigError::Invalid("Jobs must be greater than 0".to_string()));
        }

        self.toolchains.validate().map_err(ConfigError::Invalid)
    }
}

/// Summary log location for a task inside `log_dir`.
pub fn log_path(log_dir: &Path, task: Task) -> PathBuf {
    log_dir.join(format!("{}-results.log", task))
}

/// Command-line values layered over the file configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use toolchain::ProjectKind;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.root, PathBuf::from("projects"));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.jobs, 1);
        assert!(config.timeout().is_none());
        assert!(config.validate().is_ok());
        assert_eq!(
            config.log_path(Task::Test),
            PathBuf::from("logs/test-results.log")
        );
    }

    #[test]
    fn test_parse_toml() {
        let config = RunnerConfig::from_toml_str(
            r#"
            root = "packages"
            jobs = 4

            [toolchains]
            timeout_secs = 120
            inherit_output = false

            [toolchains.python]
            test = ["python", "-m", "pytest"]
            "#,
        )
        .unwrap();

        assert_eq!(config.root, PathBuf::from("packages"));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.jobs, 4);
        assert_eq!(config.timeout(), Some(Duration::from_secs(120)));
        assert!(!config.toolchains.inherit_output);
        assert_eq!(
            config
                .toolchains
                .overrides(ProjectKind::Python)
                .and_then(|o| o.get(Task::Test))
                .map(|argv| argv.join(" ")),
            Some("python -m pytest".to_string())
        );
    }

    #[test]
    fn test_parse_error() {
        let result = RunnerConfig::from_toml_str("jobs = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = RunnerConfig::load(&dir.path().join("monorun.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        assert_eq!(
            RunnerConfig::load_or_default(&path).unwrap(),
            RunnerConfig::default()
        );

        std::fs::write(&path, "log_dir = \"out\"\n").unwrap();
        let config = RunnerConfig::load_or_default(&path).unwrap();
        assert_eq!(config.log_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            root: Some(PathBuf::from("elsewhere")),
            jobs: Some(3),
            timeout_secs: Some(9),
            quiet: true,
            ..Default::default()
        };
        let config = RunnerConfig::default().apply(&overrides);

        assert_eq!(config.root, PathBuf::from("elsewhere"));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.jobs, 3);
        assert_eq!(config.timeout(), Some(Duration::from_secs(9)));
        assert!(!config.toolchains.inherit_output);
    }

    #[test]
    fn test_config_validation() {
        let mut config = RunnerConfig::default();

        config.jobs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.jobs = 2;
        config.root = PathBuf::new();
        assert!(config.validate().is_err());

        config.root = PathBuf::from("projects");
        config.toolchains.timeout_secs = Some(0);
        assert!(config.validate().is_err());

        config.toolchains.timeout_secs = None;
        assert!(config.validate().is_ok());
    }
}
