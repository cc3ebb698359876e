//! Summary renderer for the daily README document.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{permalink_path, Photo};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write summary {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render the summary document for one photo.
///
/// Pure template substitution: identical inputs produce byte-identical
/// output, and downstream consumers depend on the exact markup. Missing
/// photo fields are substituted as the literal string `undefined` rather
/// than rejected; validation happens at archive time.
#[must_use]
pub fn render_summary(date: NaiveDate, photo: &Photo) -> String {
    let url_path = permalink_path(date);
    let regular = field(&photo.urls.regular);
    let username = field(&photo.user.username);
    let name = field(&photo.user.name);
    let html = field(&photo.links.html);

    format!(
        r#"# [Daily Random Photo](https://www.dailyrandomphoto.com/)

<div align="center">
  <br>
  <br>
  <a href="https://www.dailyrandomphoto.com/p/{url_path}/"><img src="{regular}" width="600px"></a>
  <br>
  <br>
  <p class="has-text-grey">Photo by <a href="https://unsplash.com/@{username}?utm_source=Daily%20Random%20Photo&amp;utm_medium=referral" target="_blank" rel="noopener noreferrer">{name}</a> on <a href="{html}?utm_source=Daily%20Random%20Photo&amp;utm_medium=referral" target="_blank" rel="noopener noreferrer">Unsplash</a></p>
</div>"#
    )
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("undefined")
}

/// Render the summary and persist it, overwriting any previous document.
///
/// # Errors
///
/// Returns an error if the destination file cannot be written.
pub async fn write_summary(path: &Path, date: NaiveDate, photo: &Photo) -> Result<(), RenderError> {
    let contents = render_summary(date, photo);
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| RenderError::Write {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PhotoLinks, PhotoUrls, PhotoUser};

    fn sample_photo() -> Photo {
        Photo {
            id: Some("abc123".to_string()),
            user: PhotoUser {
                username: Some("jdoe".to_string()),
                name: Some("Jane Doe".to_string()),
            },
            urls: PhotoUrls {
                regular: Some("https://images.example.com/abc123?w=1080".to_string()),
            },
            links: PhotoLinks {
                html: Some("https://unsplash.com/photos/abc123".to_string()),
            },
        }
    }

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    #[test]
    fn test_render_is_byte_exact() {
        let expected = "# [Daily Random Photo](https://www.dailyrandomphoto.com/)\n\
\n\
<div align=\"center\">\n\
\x20 <br>\n\
\x20 <br>\n\
\x20 <a href=\"https://www.dailyrandomphoto.com/p/2025/2025-03-15/\"><img src=\"https://images.example.com/abc123?w=1080\" width=\"600px\"></a>\n\
\x20 <br>\n\
\x20 <br>\n\
\x20 <p class=\"has-text-grey\">Photo by <a href=\"https://unsplash.com/@jdoe?utm_source=Daily%20Random%20Photo&amp;utm_medium=referral\" target=\"_blank\" rel=\"noopener noreferrer\">Jane Doe</a> on <a href=\"https://unsplash.com/photos/abc123?utm_source=Daily%20Random%20Photo&amp;utm_medium=referral\" target=\"_blank\" rel=\"noopener noreferrer\">Unsplash</a></p>\n\
</div>";
        assert_eq!(render_summary(sample_date(), &sample_photo()), expected);
    }

    #[test]
    fn test_render_is_pure() {
        let first = render_summary(sample_date(), &sample_photo());
        let second = render_summary(sample_date(), &sample_photo());
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_fields_render_as_undefined() {
        let rendered = render_summary(sample_date(), &Photo::default());
        assert!(rendered.contains("<img src=\"undefined\""));
        assert!(rendered.contains("https://unsplash.com/@undefined?utm_source="));
        assert!(rendered.contains(">undefined</a> on "));
        assert!(rendered.contains("href=\"undefined?utm_source="));
    }

    #[tokio::test]
    async fn test_write_summary_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, "stale contents").unwrap();

        write_summary(&path, sample_date(), &sample_photo())
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_summary(sample_date(), &sample_photo()));
    }
}
