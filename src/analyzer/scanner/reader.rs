use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::file_scanner::relative_path;

/// Full text of one discovered file, keyed by its root-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Lower-cased extension, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Read `paths` with at most `concurrency` reads in flight, preserving order.
///
/// Unreadable, binary and empty files are skipped with a warning; the
/// result is a read-only snapshot for one analysis pass.
pub async fn read_sources(root: &Path, paths: Vec<PathBuf>, concurrency: usize) -> Vec<SourceFile> {
    let root = root.to_path_buf();

    stream::iter(paths)
        .map(|path| {
            let root = root.clone();
            async move { read_one(&root, path).await }
        })
        .buffered(concurrency.max(1))
        .filter_map(|file| async move { file })
        .collect()
        .await
}

async fn read_one(root: &Path, path: PathBuf) -> Option<SourceFile> {
    let rel = relative_path(root, &path).unwrap_or_else(|| path.to_string_lossy().to_string());

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not read {}: {}", rel, e);
            return None;
        }
    };

    if bytes.contains(&0) {
        warn!("Skipping binary file {}", rel);
        return None;
    }

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            debug!("{} is not valid UTF-8, decoding lossily", rel);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    if content.trim().is_empty() {
        debug!("Skipping empty file {}", rel);
        return None;
    }

    Some(SourceFile::new(rel, content))
}
