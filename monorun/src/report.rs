//! Run summaries and process exit codes.

use crate::config::log_path;
use crate::discovery::ProjectEntry;
use crate::dispatch::RunResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toolchain::Task;
use tracing::info;

/// Every dispatched project passed.
pub const EXIT_SUCCESS: i32 = 0;
/// At least one project failed, timed out, or could not start.
pub const EXIT_FAILURE: i32 = 1;
/// The run never started: bad config or missing project root.
pub const EXIT_CONFIG_ERROR: i32 = 2;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ordered results of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub task: Task,
    pub results: Vec<RunResult>,
    pub skipped: Vec<ProjectEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(RunResult::passed)
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }
}

/// Writes the plain-text summary log.
pub struct Reporter {
    log_dir: PathBuf,
}

impl Reporter {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_path(&self, task: Task) -> PathBuf {
        log_path(&self.log_dir, task)
    }

    pub fn render(&self, report: &RunReport) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "monorun {} run started {}",
            report.task,
            report.started_at.to_rfc3339()
        );

        for result in &report.results {
            let project = &result.project;
            if result.passed() {
                let _ = write!(out, "PASS  {} ({})", project.name, project.kind);
            } else {
                let _ = write!(
                    out,
                    "FAIL  {} ({}) exit={}",
                    project.name, project.kind, result.exit_code
                );
            }
            let _ = write!(out, " {:.2}s", result.duration.as_secs_f64());
            if result.timed_out {
                let _ = write!(out, " [timed out]");
            }
            if let Some(error) = &result.error {
                let _ = write!(out, " [{}]", error);
            }
            out.push('\n');
        }

        for entry in &report.skipped {
            if entry.kind.is_known() {
                let _ = writeln!(out, "SKIP  {} (no toolchain for {})", entry.name, entry.kind);
            } else {
                let _ = writeln!(out, "SKIP  {} (no recognized marker)", entry.name);
            }
        }

        let _ = writeln!(
            out,
            "summary: {} passed, {} failed, {} skipped",
            report.passed(),
            report.failed(),
            report.skipped.len()
        );
        out
    }

    /// Write the summary to `<log_dir>/<task>-results.log`.
    pub fn write(&self, report: &RunReport) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.log_dir)?;
        let path = self.log_path(report.task);
        fs::write(&path, self.render(report))?;
        info!("Wrote {} summary to {}", report.task, path.display());
        Ok(path)
    }

    pub fn to_json(report: &RunReport) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use toolchain::ProjectKind;

    fn entry(name: &str, kind: ProjectKind) -> ProjectEntry {
        ProjectEntry {
            name: name.to_string(),
            path: PathBuf::from(name),
            kind,
            marker: None,
        }
    }

    fn result(name: &str, kind: ProjectKind, exit_code: i32) -> RunResult {
        RunResult {
            project: entry(name, kind),
            exit_code,
            duration: Duration::from_millis(250),
            timed_out: false,
            error: None,
        }
    }

    fn report(results: Vec<RunResult>, skipped: Vec<ProjectEntry>) -> RunReport {
        let now = Utc::now();
        RunReport {
            task: Task::Test,
            results,
            skipped,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn test_exit_code_zero_iff_all_pass() {
        let ok = report(
            vec![
                result("a", ProjectKind::Python, 0),
                result("b", ProjectKind::Node, 0),
            ],
            vec![],
        );
        assert_eq!(ok.exit_code(), EXIT_SUCCESS);
        assert_eq!(ok.passed(), 2);

        let bad = report(
            vec![
                result("a", ProjectKind::Python, 0),
                result("c", ProjectKind::Go, 1),
            ],
            vec![],
        );
        assert_eq!(bad.exit_code(), EXIT_FAILURE);
        assert_eq!(bad.failed(), 1);

        let empty = report(vec![], vec![entry("docs", ProjectKind::Unknown)]);
        assert_eq!(empty.exit_code(), EXIT_SUCCESS);
    }

    #[test]
    fn test_render_lines() {
        let mut timed_out = result("slow", ProjectKind::Rust, toolchain::TIMEOUT_EXIT_CODE);
        timed_out.timed_out = true;

        let report = report(
            vec![result("a", ProjectKind::Python, 0), result("c", ProjectKind::Go, 1), timed_out],
            vec![entry("docs", ProjectKind::Unknown)],
        );
        let text = Reporter::new("logs").render(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("monorun test run started "));
        assert_eq!(lines[1], "PASS  a (python) 0.25s");
        assert_eq!(lines[2], "FAIL  c (go) exit=1 0.25s");
        assert_eq!(lines[3], "FAIL  slow (rust) exit=124 0.25s [timed out]");
        assert_eq!(lines[4], "SKIP  docs (no recognized marker)");
        assert_eq!(lines[5], "summary: 1 passed, 2 failed, 1 skipped");
    }

    #[test]
    fn test_write_creates_log_dir() {
        let dir = TempDir::new().unwrap();
        let reporter = Reporter::new(dir.path().join("logs"));
        let report = report(vec![result("a", ProjectKind::Node, 0)], vec![]);

        let path = reporter.write(&report).unwrap();
        assert_eq!(path, dir.path().join("logs").join("test-results.log"));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("PASS  a (node)"));
    }

    #[test]
    fn test_json_report() {
        let report = report(vec![result("a", ProjectKind::Go, 3)], vec![]);
        let json = Reporter::to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["task"], "test");
        assert_eq!(value["results"][0]["exit_code"], 3);
        assert_eq!(value["results"][0]["project"]["kind"], "go");
    }
}
