//! Tree walking and line counting.

use crate::{ProjectStats, StatsError, StatsResult, NO_EXTENSION};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into
pub const IGNORED_DIRS: [&str; 3] = ["node_modules", "target", "__pycache__"];

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && IGNORED_DIRS
            .iter()
            .any(|name| entry.file_name() == std::ffi::OsStr::new(name))
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// Lines as a text editor counts them: a trailing partial line counts.
fn count_lines(bytes: &[u8]) -> u64 {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count() as u64;
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// Collect statistics for every non-hidden file under `root`.
pub fn collect(root: &Path) -> StatsResult<ProjectStats> {
    if !root.exists() {
        return Err(StatsError::RootMissing(root.to_path_buf()));
    }

    let mut stats = ProjectStats::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(is_hidden(e) || is_ignored_dir(e)));

    for entry in walker {
        // Unreadable or vanished directories are skipped, not fatal
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        // Unreadable files still count, with zero lines
        let lines = match fs::read(entry.path()) {
            Ok(bytes) => count_lines(&bytes),
            Err(e) => {
                debug!("Could not read {}: {}", entry.path().display(), e);
                0
            }
        };

        stats.add_file(&extension_of(entry.path()), lines);
    }

    stats.generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    Ok(stats)
}
