//! Project discovery.
//!
//! Lists the immediate subdirectories of the project root and classifies each
//! by its marker files. Names are collected and sorted eagerly so iteration
//! order is stable; classification happens lazily as the [`Discovery`]
//! iterator advances.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toolchain::ProjectKind;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Project root {} does not exist", .0.display())]
    RootMissing(PathBuf),

    #[error("Project root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A project directory paired with the toolchain that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: ProjectKind,
    /// Marker file that decided `kind`
    pub marker: Option<String>,
}

impl ProjectEntry {
    pub fn classify(name: impl Into<String>, path: PathBuf) -> Self {
        let detected = ProjectKind::detect(&path);
        Self {
            name: name.into(),
            kind: detected
                .map(|(kind, _)| kind)
                .unwrap_or(ProjectKind::Unknown),
            marker: detected.map(|(_, marker)| marker.to_string()),
            path,
        }
    }
}

/// Lazily classified projects, in name order.
#[derive(Debug)]
pub struct Discovery {
    dirs: std::vec::IntoIter<(String, PathBuf)>,
}

impl Iterator for Discovery {
    type Item = ProjectEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let (name, path) = self.dirs.next()?;
        let entry = ProjectEntry::classify(name, path);
        debug!(
            "Classified {} as {} (marker: {})",
            entry.name,
            entry.kind,
            entry.marker.as_deref().unwrap_or("none")
        );
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.dirs.size_hint()
    }
}

impl ExactSizeIterator for Discovery {}

/// Scan `root` for project directories. Hidden directories and plain files
/// are ignored.
pub fn discover(root: &Path) -> Result<Discovery, DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::RootMissing(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let io_err = |source: std::io::Error| DiscoveryError::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if name.starts_with('.') || !path.is_dir() {
            continue;
        }
        dirs.push((name, path));
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));

    debug!("Found {} candidate directories under {}", dirs.len(), root.display());
    Ok(Discovery {
        dirs: dirs.into_iter(),
    })
}
