//! Data model for photo records and the persisted archive.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// One day's externally-produced photo metadata file.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoRecord {
    #[serde(deserialize_with = "deserialize_record_date")]
    pub date: NaiveDate,
    pub photo: Photo,
}

/// Photo metadata as produced upstream.
///
/// Leaf fields are optional so a partially-populated record still parses;
/// the summary renderer substitutes the literal string `undefined` for
/// anything missing, and validation happens at archive time instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user: PhotoUser,
    #[serde(default)]
    pub urls: PhotoUrls,
    #[serde(default)]
    pub links: PhotoLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoUrls {
    #[serde(default)]
    pub regular: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoLinks {
    #[serde(default)]
    pub html: Option<String>,
}

/// A required field was absent from a photo record.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("photo record is missing required field: {0}")]
pub struct MissingField(pub &'static str);

/// A strict projection of a validated [`PhotoRecord`], persisted in the
/// archive under its `yyyy-mm-dd` date key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    #[serde(rename = "photoId")]
    pub photo_id: String,
    pub user: EntryUser,
    pub urls: EntryUrls,
    pub links: EntryLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryUser {
    pub username: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryUrls {
    pub regular: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLinks {
    pub html: String,
}

impl ArchiveEntry {
    /// Project a photo record into an archive entry.
    ///
    /// This is the validation step for a record: every field the archive
    /// carries must be present.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first absent field.
    pub fn from_record(record: &PhotoRecord) -> Result<Self, MissingField> {
        let photo = &record.photo;
        Ok(Self {
            photo_id: require(&photo.id, "photo.id")?,
            user: EntryUser {
                username: require(&photo.user.username, "user.username")?,
                name: require(&photo.user.name, "user.name")?,
            },
            urls: EntryUrls {
                regular: require(&photo.urls.regular, "urls.regular")?,
            },
            links: EntryLinks {
                html: require(&photo.links.html, "links.html")?,
            },
        })
    }
}

fn require(value: &Option<String>, name: &'static str) -> Result<String, MissingField> {
    value.clone().ok_or(MissingField(name))
}

/// The archive mapping as persisted: date key to entry.
///
/// For `yyyy-mm-dd` keys, lexicographic order equals calendar order, so the
/// newest entries are at the back of the map.
pub type ArchiveMap = BTreeMap<String, ArchiveEntry>;

/// Archive key for a calendar date, `yyyy-mm-dd`.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Canonical permalink path for a date, `yyyy/yyyy-mm-dd`.
#[must_use]
pub fn permalink_path(date: NaiveDate) -> String {
    date.format("%Y/%Y-%m-%d").to_string()
}

/// Accept either a bare `yyyy-mm-dd` date or a full ISO-8601 datetime.
fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|datetime| datetime.date())
}

fn deserialize_record_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_record_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 date: {raw}")))
}
