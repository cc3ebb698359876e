//! Composition root: runs the publishing stages in order.
//!
//! Stage failures are logged here and never abort the remaining stages. The
//! renderer and the archive upsert need a loaded record; pruning, the feed,
//! and the retention sweep always run.

use chrono::{Datelike, Utc};
use tracing::{error, info};

use crate::archive::PhotoArchive;
use crate::config::Config;
use crate::{feed, loader, readme, sweep};

/// Run one full publishing pass.
pub async fn run_once(config: &Config) {
    let now = Utc::now();
    let archive = PhotoArchive::new(&config.archive_path, config.max_archive_entries);

    let year_dir = config.year_dir(now.year());
    let record = match loader::load_latest(&year_dir).await {
        Ok(Some(record)) => {
            info!(date = %record.date, "loaded latest photo record");
            Some(record)
        }
        Ok(None) => {
            info!(path = %year_dir.display(), "no photo record found");
            None
        }
        Err(e) => {
            error!("failed to load latest photo record: {e}");
            None
        }
    };

    if let Some(record) = &record {
        match readme::write_summary(&config.readme_path, record.date, &record.photo).await {
            Ok(()) => info!(path = %config.readme_path.display(), "wrote summary document"),
            Err(e) => error!("failed to write summary document: {e}"),
        }

        match archive.upsert(record).await {
            Ok(()) => info!(date = %record.date, "updated archive"),
            Err(e) => error!("failed to update archive: {e}"),
        }
    }

    match archive.prune().await {
        Ok(0) => info!("archive within limit, nothing pruned"),
        Ok(removed) => info!(removed, "pruned archive"),
        Err(e) => error!("failed to prune archive: {e}"),
    }

    match feed::write_feed(&archive, config, now).await {
        Ok(items) => info!(items, path = %config.feed_path.display(), "wrote feed"),
        Err(e) => error!("failed to write feed: {e}"),
    }

    match sweep::sweep_expired(&config.data_root, config.retention_days, now).await {
        Ok(stats) => info!(
            files_deleted = stats.files_deleted,
            dirs_deleted = stats.dirs_deleted,
            "retention sweep complete"
        ),
        Err(e) => error!("retention sweep aborted: {e}"),
    }
}
