//! End-to-end search over the default collector registry, replaying the
//! demo fixture file.
//!
//! Run with: `cargo test --test fixture_search`

use person_finder::collector::FixtureFetcher;
use person_finder::{AggregatedResult, Finder, FinderConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn demo_fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/fixtures.yaml")
}

async fn search_demo(location: Option<&str>) -> AggregatedResult {
    let fetcher = FixtureFetcher::from_path(&demo_fixtures()).unwrap();
    let config = FinderConfig::default();
    let finder = Finder::new(config.build_registry(Arc::new(fetcher)), config.search.clone());
    finder
        .search("Jordan Lee", location, Some("Acme"), Duration::from_secs(10))
        .await
}

#[tokio::test]
async fn test_demo_search_merges_across_collectors() {
    let result = search_demo(Some("Austin, TX")).await;

    let instagram = result
        .profiles
        .iter()
        .find(|p| p.source == "instagram" && p.stable_key == "jordanlee")
        .expect("instagram profile");
    assert!(instagram.collectors.contains("platform_search:instagram"));
    assert!(instagram.collectors.contains("handle_probe:instagram"));
    assert!(instagram.collectors.contains("web_mentions:google"));
    assert_eq!(instagram.followers, 120);
    assert_eq!(instagram.posts, 64);
    assert_eq!(instagram.location, "Austin, TX");

    let keys: Vec<_> = result
        .profiles
        .iter()
        .map(|p| (p.source.as_str(), p.stable_key.as_str()))
        .collect();
    let unique: std::collections::BTreeSet<_> = keys.iter().collect();
    assert_eq!(keys.len(), unique.len());
}

#[tokio::test]
async fn test_demo_search_isolates_unavailable_source() {
    let result = search_demo(None).await;

    let facebook = result.report("platform_search:facebook").unwrap();
    assert!(facebook.outcome.is_failed());
    assert_eq!(facebook.records, 0);
    assert!(result.profiles.iter().all(|p| p.source != "facebook"));

    assert!(result.report("platform_search:instagram").unwrap().outcome.is_completed());
    assert_eq!(result.collectors.len(), FinderConfig::default().collectors.len());
}

#[tokio::test]
async fn test_demo_search_derives_attributes() {
    let result = search_demo(Some("Austin, TX")).await;

    assert!(result.attributes.locations.contains("Austin, TX"));
    assert!(result.attributes.locations.contains("Austin, Texas"));
    assert!(result.attributes.skills.contains("Rust"));
    assert!(result.attributes.roles.contains("Senior Engineer at Acme"));
    assert!(result.attributes.interests.contains("travel"));
    assert!(result.confidence() > 0.0);
    assert!(result.confidence() <= 1.0);
}

#[tokio::test]
async fn test_demo_search_collects_mentions() {
    let result = search_demo(None).await;

    let urls: Vec<&str> = result.mentions.iter().map(|m| m.url.as_str()).collect();
    assert!(urls.contains(&"https://news.example.com/tech/jordan-lee-acme"));
    assert!(urls.contains(&"https://blog.example.com/2024/jordan-lee-interview"));
    assert!(!urls.iter().any(|u| u.contains("instagram.com")));

    let relevances: Vec<f64> = result.mentions.iter().map(|m| m.relevance).collect();
    assert!(relevances.windows(2).all(|w| w[0] >= w[1]));
}
