//! Latest-record loader.
//!
//! Finds the newest photo record in a year directory. The upstream producer
//! names files after zero-padded dates, so the greatest filename is the most
//! recent record. That naming is a precondition on the producer; the loader
//! does not verify it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::model::PhotoRecord;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read data directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read photo record {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse photo record {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the most recent photo record from `dir`.
///
/// Returns `Ok(None)` when the directory does not exist or holds no regular
/// files; missing data is not an error.
///
/// # Errors
///
/// Returns an error if the directory or the selected file cannot be read, or
/// if the file is not valid photo record JSON.
pub async fn load_latest(dir: &Path) -> Result<Option<PhotoRecord>, LoadError> {
    let read_dir_err = |source| LoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %dir.display(), "data directory not present");
            return Ok(None);
        }
        Err(e) => return Err(read_dir_err(e)),
    };

    let mut newest: Option<PathBuf> = None;
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        if !entry.file_type().await.map_err(read_dir_err)?.is_file() {
            continue;
        }
        let path = entry.path();
        match &newest {
            Some(current) if current.file_name() >= path.file_name() => {}
            _ => newest = Some(path),
        }
    }

    let Some(path) = newest else {
        return Ok(None);
    };

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| LoadError::ReadFile {
            path: path.clone(),
            source: e,
        })?;
    let record = serde_json::from_str(&contents).map_err(|e| LoadError::Parse {
        path: path.clone(),
        source: e,
    })?;

    debug!(path = %path.display(), "loaded latest photo record");
    Ok(Some(record))
}
