//! RSS 2.0 feed generation from the photo archive.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::warn;

use crate::archive::{ArchiveError, PhotoArchive};
use crate::config::Config;
use crate::model::{permalink_path, ArchiveEntry, ArchiveMap};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("failed to write feed {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Query string appended to attribution links; escaped with the rest of the
/// item description.
const ATTRIBUTION_QUERY: &str = "?utm_source=Daily%20Random%20Photo&utm_medium=referral";

/// Generate the RSS 2.0 feed document for the archive contents.
///
/// Items appear in descending calendar-date order. `now` supplies the
/// `lastBuildDate`, and the envelope `pubDate` when the archive is empty;
/// otherwise `pubDate` is midnight of the newest entry's date.
#[must_use]
pub fn generate_feed(entries: &ArchiveMap, config: &Config, now: DateTime<Utc>) -> String {
    let items: String = entries
        .iter()
        .rev()
        .filter_map(|(key, entry)| feed_item(key, entry, config))
        .collect::<Vec<_>>()
        .join("\n");

    let pub_date = entries
        .keys()
        .next_back()
        .and_then(|key| parse_key(key))
        .map_or_else(|| now.to_rfc2822(), midnight_rfc2822);

    let title = xml_escape(&config.feed_title);
    let link = &config.feed_link;
    let description = xml_escape(&config.feed_description);
    let last_build = now.to_rfc2822();
    let ttl = config.feed_ttl_minutes;

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>{title}</title>
    <link>{link}</link>
    <description>{description}</description>
    <lastBuildDate>{last_build}</lastBuildDate>
    <pubDate>{pub_date}</pubDate>
    <ttl>{ttl}</ttl>
{items}
  </channel>
</rss>"#
    )
}

fn feed_item(key: &str, entry: &ArchiveEntry, config: &Config) -> Option<String> {
    let Some(date) = parse_key(key) else {
        warn!(key, "skipping archive entry with non-date key");
        return None;
    };

    let title = xml_escape(&format!("{} {key}", config.feed_title));
    let link = format!("{}p/{}/", config.feed_link, permalink_path(date));
    let description = xml_escape(&format!(
        r#"<img src="{regular}"><p>Photo by <a href="https://unsplash.com/@{username}{ATTRIBUTION_QUERY}">{name}</a> on <a href="{html}{ATTRIBUTION_QUERY}">Unsplash</a></p>"#,
        regular = entry.urls.regular,
        username = entry.user.username,
        name = entry.user.name,
        html = entry.links.html,
    ));
    let pub_date = midnight_rfc2822(date);

    Some(format!(
        r#"    <item>
      <title>{title}</title>
      <link>{link}</link>
      <guid isPermaLink="true">{link}</guid>
      <description>{description}</description>
      <pubDate>{pub_date}</pubDate>
    </item>"#
    ))
}

fn parse_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

fn midnight_rfc2822(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().to_rfc2822())
        .unwrap_or_default()
}

/// Escape XML special characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Regenerate the feed file from the persisted archive, overwriting any
/// previous document. Returns the number of entries in the feed.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or the feed file cannot
/// be written; either way the previous feed document is left intact.
pub async fn write_feed(
    archive: &PhotoArchive,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<usize, FeedError> {
    let entries = archive.load().await?;
    let xml = generate_feed(&entries, config, now);
    tokio::fs::write(&config.feed_path, xml)
        .await
        .map_err(|e| FeedError::Write {
            path: config.feed_path.clone(),
            source: e,
        })?;
    Ok(entries.len())
}
