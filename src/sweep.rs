//! Retention sweeper for raw photo record files.
//!
//! Deletes data files older than the retention window and removes year
//! directories they leave empty. Runs independently of the archive: the
//! archive holds a projection of each record, so deleting a source file
//! never affects archived entries.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

static YEAR_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one retention sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub files_deleted: usize,
    pub dirs_deleted: usize,
}

/// Delete regular files older than `retention_days` from every year-named
/// (`\d{4}`) subdirectory of `data_root`, then remove each directory that
/// ends up empty unless it is the current year's. Entries that are not
/// year-named directories are ignored. A missing `data_root` is a zero-work
/// sweep.
///
/// Best-effort, not transactional: deletions already performed stand even
/// when a later step fails.
///
/// # Errors
///
/// Returns an error on the first filesystem operation that fails; the sweep
/// stops there.
pub async fn sweep_expired(
    data_root: &Path,
    retention_days: i64,
    now: DateTime<Utc>,
) -> Result<SweepStats, SweepError> {
    let cutoff = now - Duration::days(retention_days);
    let current_year = now.year().to_string();
    let mut stats = SweepStats::default();

    let mut root = match tokio::fs::read_dir(data_root).await {
        Ok(root) => root,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(stats),
        Err(e) => return Err(scan_err(data_root, e)),
    };

    while let Some(entry) = root.next_entry().await.map_err(|e| scan_err(data_root, e))? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !YEAR_DIR.is_match(name) {
            continue;
        }
        let dir = entry.path();
        if !entry.file_type().await.map_err(|e| scan_err(&dir, e))?.is_dir() {
            continue;
        }

        let remaining = sweep_year_dir(&dir, cutoff, &mut stats).await?;

        if remaining == 0 && name != current_year {
            tokio::fs::remove_dir(&dir)
                .await
                .map_err(|e| delete_err(&dir, e))?;
            debug!(path = %dir.display(), "removed emptied year directory");
            stats.dirs_deleted += 1;
        }
    }

    Ok(stats)
}

/// Delete expired files in one year directory; returns how many entries
/// survive.
async fn sweep_year_dir(
    dir: &Path,
    cutoff: DateTime<Utc>,
    stats: &mut SweepStats,
) -> Result<usize, SweepError> {
    let mut remaining = 0usize;
    let mut files = tokio::fs::read_dir(dir).await.map_err(|e| scan_err(dir, e))?;

    while let Some(file) = files.next_entry().await.map_err(|e| scan_err(dir, e))? {
        let path = file.path();
        if !file.file_type().await.map_err(|e| scan_err(&path, e))?.is_file() {
            remaining += 1;
            continue;
        }

        let metadata = file.metadata().await.map_err(|e| scan_err(&path, e))?;
        let modified: DateTime<Utc> = metadata
            .modified()
            .map_err(|e| scan_err(&path, e))?
            .into();

        if modified < cutoff {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| delete_err(&path, e))?;
            debug!(path = %path.display(), "deleted expired data file");
            stats.files_deleted += 1;
        } else {
            remaining += 1;
        }
    }

    Ok(remaining)
}

fn scan_err(path: &Path, source: std::io::Error) -> SweepError {
    SweepError::Scan {
        path: path.to_path_buf(),
        source,
    }
}

fn delete_err(path: &Path, source: std::io::Error) -> SweepError {
    SweepError::Delete {
        path: path.to_path_buf(),
        source,
    }
}
