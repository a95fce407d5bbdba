//! Repository statistics for monorun
//!
//! Walks a source tree and tallies files and lines per file extension,
//! skipping hidden entries and dependency/build directories.

pub mod collector;

pub use collector::{collect, IGNORED_DIRS};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors related to statistics collection
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Path does not exist: {0}")]
    RootMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StatsResult<T> = Result<T, StatsError>;

/// Bucket name for files without an extension
pub const NO_EXTENSION: &str = "no_extension";

/// Totals for a single extension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionStats {
    pub count: u64,
    pub lines: u64,
}

/// Statistics for a whole tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub by_extension: BTreeMap<String, ExtensionStats>,
    pub total_files: u64,
    pub total_lines: u64,
    pub generated_at: String,
}

impl ProjectStats {
    /// Record one file
    pub fn add_file(&mut self, extension: &str, lines: u64) {
        let entry = self.by_extension.entry(extension.to_string()).or_default();
        entry.count += 1;
        entry.lines += lines;
        self.total_files += 1;
        self.total_lines += lines;
    }

    /// Extensions ordered by line count, largest first; ties by name
    pub fn sorted_by_lines(&self) -> Vec<(&str, ExtensionStats)> {
        let mut sorted: Vec<_> = self
            .by_extension
            .iter()
            .map(|(ext, stats)| (ext.as_str(), *stats))
            .collect();
        sorted.sort_by(|a, b| b.1.lines.cmp(&a.1.lines).then_with(|| a.0.cmp(b.0)));
        sorted
    }

    /// Human-readable summary table
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total files: {}", self.total_files);
        let _ = writeln!(out, "Total lines: {}", group_thousands(self.total_lines));
        let _ = writeln!(out, "\nFiles by extension:");
        for (ext, stats) in self.sorted_by_lines() {
            let _ = writeln!(
                out,
                "  .{:<10} {:>5} files, {:>8} lines",
                ext,
                stats.count,
                group_thousands(stats.lines)
            );
        }
        out
    }

    /// Write the statistics as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> StatsResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_file_updates_totals() {
        let mut stats = ProjectStats::default();
        stats.add_file("rs", 10);
        stats.add_file("rs", 5);
        stats.add_file("py", 3);

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_lines, 18);
        assert_eq!(
            stats.by_extension["rs"],
            ExtensionStats { count: 2, lines: 15 }
        );
    }

    #[test]
    fn test_sorted_by_lines() {
        let mut stats = ProjectStats::default();
        stats.add_file("md", 4);
        stats.add_file("go", 40);
        stats.add_file("js", 4);

        let order: Vec<&str> = stats.sorted_by_lines().iter().map(|(e, _)| *e).collect();
        assert_eq!(order, vec!["go", "js", "md"]);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_render_lists_extensions() {
        let mut stats = ProjectStats::default();
        stats.add_file("py", 1200);
        let rendered = stats.render();
        assert!(rendered.contains("Total files: 1"));
        assert!(rendered.contains("Total lines: 1,200"));
        assert!(rendered.contains(".py"));
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("project_stats.json");

        let mut stats = ProjectStats::default();
        stats.add_file(NO_EXTENSION, 2);
        stats.write_json(&path).unwrap();

        let loaded: ProjectStats =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, stats);
    }
}
