//! Bounded, date-keyed archive of past photo records.
//!
//! The archive is a single JSON object mapping `yyyy-mm-dd` keys to
//! projected entries. Every operation is a full read-modify-write pass over
//! that file. There is no file locking; one scheduled invocation at a time
//! is assumed.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{date_key, ArchiveEntry, ArchiveMap, MissingField, PhotoRecord};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to read archive {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse archive {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize archive: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write archive {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    MissingField(#[from] MissingField),
}

/// Handle to the persisted archive mapping.
#[derive(Debug, Clone)]
pub struct PhotoArchive {
    path: PathBuf,
    max_entries: usize,
}

impl PhotoArchive {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries,
        }
    }

    /// Load the archive mapping. An absent file is an empty archive,
    /// indistinguishable from one that was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ArchiveMap, ArchiveError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ArchiveMap::new()),
            Err(e) => {
                return Err(ArchiveError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|e| ArchiveError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Insert or overwrite the entry for the record's date and persist the
    /// full mapping. Idempotent per date. A corrupt existing archive is
    /// reset to empty before the insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing a projected field (nothing
    /// is written) or if the archive cannot be read or rewritten.
    pub async fn upsert(&self, record: &PhotoRecord) -> Result<(), ArchiveError> {
        let entry = ArchiveEntry::from_record(record)?;
        let mut entries = match self.load().await {
            Ok(entries) => entries,
            Err(e @ ArchiveError::Parse { .. }) => {
                warn!("resetting corrupt archive: {e}");
                ArchiveMap::new()
            }
            Err(e) => return Err(e),
        };

        let key = date_key(record.date);
        entries.insert(key.clone(), entry);
        self.persist(&entries).await?;

        debug!(key = %key, entries = entries.len(), "archived photo record");
        Ok(())
    }

    /// Drop everything but the `max_entries` newest dates.
    ///
    /// Returns the number of entries removed. The file is rewritten only
    /// when that number is non-zero; an archive at or under the limit is
    /// left untouched on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read or rewritten.
    pub async fn prune(&self) -> Result<usize, ArchiveError> {
        let mut entries = self.load().await?;
        if entries.len() <= self.max_entries {
            return Ok(0);
        }

        // Keys sort lexicographically, which for date keys is calendar
        // order; everything past the newest max_entries goes.
        let expired: Vec<String> = entries
            .keys()
            .rev()
            .skip(self.max_entries)
            .cloned()
            .collect();
        for key in &expired {
            entries.remove(key);
        }
        self.persist(&entries).await?;

        debug!(removed = expired.len(), kept = entries.len(), "pruned archive");
        Ok(expired.len())
    }

    /// Serialize fully in memory before a single write, so a failure here
    /// never leaves a truncated file behind.
    async fn persist(&self, entries: &ArchiveMap) -> Result<(), ArchiveError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| ArchiveError::Serialize { source: e })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ArchiveError::Write {
                path: self.path.clone(),
                source: e,
            })
    }
}
