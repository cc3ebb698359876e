//! End-to-end tests for one publishing pass.

use chrono::{Datelike, Utc};
use daily_photo_publisher::config::Config;
use daily_photo_publisher::pipeline::run_once;
use tempfile::TempDir;

fn seed_record(config: &Config, date: &str, id: &str) {
    let year_dir = config.year_dir(Utc::now().year());
    std::fs::create_dir_all(&year_dir).unwrap();
    let contents = serde_json::json!({
        "date": date,
        "photo": {
            "id": id,
            "user": { "username": "jdoe", "name": "Jane Doe" },
            "urls": { "regular": format!("https://images.example.com/{id}") },
            "links": { "html": format!("https://unsplash.com/photos/{id}") }
        }
    });
    std::fs::write(year_dir.join(format!("{date}.json")), contents.to_string()).unwrap();
}

#[tokio::test]
async fn test_full_run_publishes_all_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = Config::rooted_at(dir.path());
    seed_record(&config, "2025-01-02", "abc");

    run_once(&config).await;

    let readme = std::fs::read_to_string(&config.readme_path).unwrap();
    assert!(readme.starts_with("# [Daily Random Photo]"));
    assert!(readme.contains("https://www.dailyrandomphoto.com/p/2025/2025-01-02/"));
    assert!(readme.contains("https://images.example.com/abc"));

    let archive = std::fs::read_to_string(&config.archive_path).unwrap();
    assert!(archive.contains("\"2025-01-02\""));
    assert!(archive.contains("\"photoId\": \"abc\""));

    let feed = std::fs::read_to_string(&config.feed_path).unwrap();
    assert_eq!(feed.matches("<item>").count(), 1);
    assert!(feed.contains("<guid isPermaLink=\"true\">https://www.dailyrandomphoto.com/p/2025/2025-01-02/</guid>"));

    // The source record is fresh, so the sweep leaves it alone.
    assert!(config
        .year_dir(Utc::now().year())
        .join("2025-01-02.json")
        .exists());
}

#[tokio::test]
async fn test_repeat_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = Config::rooted_at(dir.path());
    seed_record(&config, "2025-01-02", "abc");

    run_once(&config).await;
    let first_readme = std::fs::read_to_string(&config.readme_path).unwrap();
    let first_archive = std::fs::read_to_string(&config.archive_path).unwrap();

    run_once(&config).await;
    assert_eq!(std::fs::read_to_string(&config.readme_path).unwrap(), first_readme);
    assert_eq!(std::fs::read_to_string(&config.archive_path).unwrap(), first_archive);
}

#[tokio::test]
async fn test_no_data_skips_readme_and_archive_but_feeds() {
    let dir = TempDir::new().unwrap();
    let config = Config::rooted_at(dir.path());

    // Pre-existing archive from earlier runs.
    std::fs::write(
        &config.archive_path,
        serde_json::json!({
            "2025-01-01": {
                "photoId": "old",
                "user": { "username": "jdoe", "name": "Jane Doe" },
                "urls": { "regular": "https://images.example.com/old" },
                "links": { "html": "https://unsplash.com/photos/old" }
            }
        })
        .to_string(),
    )
    .unwrap();

    run_once(&config).await;

    assert!(!config.readme_path.exists());
    let feed = std::fs::read_to_string(&config.feed_path).unwrap();
    assert_eq!(feed.matches("<item>").count(), 1);
    assert!(feed.contains("2025-01-01"));
}

#[tokio::test]
async fn test_empty_state_still_writes_empty_feed() {
    let dir = TempDir::new().unwrap();
    let config = Config::rooted_at(dir.path());

    run_once(&config).await;

    assert!(!config.readme_path.exists());
    assert!(!config.archive_path.exists());
    let feed = std::fs::read_to_string(&config.feed_path).unwrap();
    assert!(!feed.contains("<item>"));
    assert!(feed.contains("<rss version=\"2.0\">"));
}

#[tokio::test]
async fn test_malformed_record_degrades_to_no_data() {
    let dir = TempDir::new().unwrap();
    let config = Config::rooted_at(dir.path());
    let year_dir = config.year_dir(Utc::now().year());
    std::fs::create_dir_all(&year_dir).unwrap();
    std::fs::write(year_dir.join("2025-01-02.json"), "{ not json").unwrap();

    run_once(&config).await;

    assert!(!config.readme_path.exists());
    assert!(!config.archive_path.exists());
    assert!(config.feed_path.exists());
}

#[tokio::test]
async fn test_corrupt_archive_leaves_previous_feed_intact() {
    let dir = TempDir::new().unwrap();
    let config = Config::rooted_at(dir.path());
    std::fs::write(&config.archive_path, "{ not json").unwrap();
    std::fs::write(&config.feed_path, "previous feed").unwrap();

    run_once(&config).await;

    assert_eq!(
        std::fs::read_to_string(&config.feed_path).unwrap(),
        "previous feed"
    );
}

#[tokio::test]
async fn test_run_prunes_oversized_archive() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::rooted_at(dir.path());
    config.max_archive_entries = 1;
    seed_record(&config, "2025-01-02", "b");

    let entry = |id: &str| {
        serde_json::json!({
            "photoId": id,
            "user": { "username": "jdoe", "name": "Jane Doe" },
            "urls": { "regular": format!("https://images.example.com/{id}") },
            "links": { "html": format!("https://unsplash.com/photos/{id}") }
        })
    };
    std::fs::write(
        &config.archive_path,
        serde_json::json!({ "2025-01-01": entry("a") }).to_string(),
    )
    .unwrap();

    run_once(&config).await;

    let archive: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.archive_path).unwrap()).unwrap();
    let keys: Vec<_> = archive.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["2025-01-02"]);

    let feed = std::fs::read_to_string(&config.feed_path).unwrap();
    assert_eq!(feed.matches("<item>").count(), 1);
}
