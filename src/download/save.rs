//! Save capability for fetched files.
//!
//! The session never touches the filesystem directly; it hands bytes to a
//! [`SaveSink`]. Production uses [`DiskSink`]; tests inject a recorder.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Receives the fully materialized file exactly once per successful fetch.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Persists `bytes` under (a variant of) `filename` and returns where
    /// it ended up.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes into a target directory with collision-safe ` (N)` renaming.
pub struct DiskSink {
    dir: PathBuf,
}

impl DiskSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SaveSink for DiskSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        // Server-supplied names never get to pick the directory.
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(super::headers::DEFAULT_FILENAME);

        let path = find_available_path(self.dir.join(name)).await;
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), len = bytes.len(), "file saved");
        Ok(path)
    }
}

/// Finds an available path by appending a ` (N)` suffix while the target
/// exists. Pure path resolution; creates nothing.
///
/// Note: small TOCTOU window between this call and file creation. For a
/// personal download tool that risk is acceptable.
pub async fn find_available_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }

    let parent = path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();

    // Split at the first dot so "archive.tar.gz" keeps its full extension.
    let (stem, extensions) = match filename.find('.') {
        Some(0) | None => (filename.as_str(), ""),
        Some(dot) => (&filename[..dot], &filename[dot..]),
    };

    let mut counter = 1u32;
    loop {
        let candidate = parent.join(format!("{stem} ({counter}){extensions}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
