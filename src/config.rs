use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },
}

/// Publisher configuration.
///
/// The production values are fixed constants supplied by [`Config::default`];
/// there are no runtime flags or environment variables. Components receive
/// the configuration explicitly rather than reading module-level globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the per-year photo record directories.
    pub data_root: PathBuf,
    /// Destination of the rendered summary document.
    pub readme_path: PathBuf,
    /// Persisted archive mapping.
    pub archive_path: PathBuf,
    /// Generated RSS feed.
    pub feed_path: PathBuf,
    /// Upper bound on archive entries after pruning.
    pub max_archive_entries: usize,
    /// Age in days beyond which raw data files are deleted.
    pub retention_days: i64,

    // Feed envelope
    pub feed_title: String,
    pub feed_link: String,
    pub feed_description: String,
    pub feed_ttl_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            readme_path: PathBuf::from("README.md"),
            archive_path: PathBuf::from("archives.json"),
            feed_path: PathBuf::from("rss.xml"),
            max_archive_entries: 30,
            retention_days: 30,
            feed_title: "Daily Random Photo".to_string(),
            feed_link: "https://www.dailyrandomphoto.com/".to_string(),
            feed_description: "A random photo, republished every day.".to_string(),
            feed_ttl_minutes: 60,
        }
    }
}

impl Config {
    /// Configuration with every path rooted in `dir`, for tests.
    #[must_use]
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            data_root: dir.join("data"),
            readme_path: dir.join("README.md"),
            archive_path: dir.join("archives.json"),
            feed_path: dir.join("rss.xml"),
            ..Self::default()
        }
    }

    /// Data directory for one calendar year.
    #[must_use]
    pub fn year_dir(&self, year: i32) -> PathBuf {
        self.data_root.join(year.to_string())
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_archive_entries == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_archive_entries",
                message: "must be at least 1".to_string(),
            });
        }
        if self.retention_days < 1 {
            return Err(ConfigError::InvalidValue {
                name: "retention_days",
                message: "must be at least 1".to_string(),
            });
        }
        if self.feed_title.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "feed_title",
                message: "cannot be empty".to_string(),
            });
        }
        // Permalinks are built by appending to the site link.
        if !self.feed_link.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                name: "feed_link",
                message: "must end with a trailing slash".to_string(),
            });
        }
        Ok(())
    }
}
