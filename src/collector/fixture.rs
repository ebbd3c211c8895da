//! Offline fetcher backed by canned responses
//!
//! Fixture files are YAML (or JSON, which YAML accepts). Responses are keyed
//! by exact query text with `"*"` as a wildcard:
//!
//! ```yaml
//! latency_ms: 20
//! unavailable: [facebook]
//! failing_queries: ["\"Jordan Lee\" Twitter"]
//! platforms:
//!   instagram:
//!     search:
//!       "*":
//!         - { handle: jordanlee, full_name: Jordan Lee, followers: 120 }
//!     handles:
//!       jordanlee: { handle: jordanlee, full_name: Jordan Lee }
//! engines:
//!   google:
//!     "*":
//!       - { url: "https://news.example.com/a", title: Jordan Lee profile }
//! directory:
//!   "*": []
//! news:
//!   "*": []
//! ```

use super::fetcher::{FetchError, RawProfile, SearchHit, SourceFetcher};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const WILDCARD: &str = "*";

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fixture parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Canned responses for one platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformFixture {
    pub search: HashMap<String, Vec<RawProfile>>,
    pub handles: HashMap<String, RawProfile>,
}

/// Contents of a fixture file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    /// Delay applied to every call
    pub latency_ms: u64,
    /// Sources (platform, engine, `directory`, `news`) that fail structurally
    pub unavailable: Vec<String>,
    /// Query texts that fail with a transient error
    pub failing_queries: Vec<String>,
    pub platforms: HashMap<String, PlatformFixture>,
    pub engines: HashMap<String, HashMap<String, Vec<SearchHit>>>,
    pub directory: HashMap<String, Vec<RawProfile>>,
    pub news: HashMap<String, Vec<SearchHit>>,
}

/// A [`SourceFetcher`] that replays [`Fixtures`]
#[derive(Debug, Clone, Default)]
pub struct FixtureFetcher {
    fixtures: Fixtures,
}

impl FixtureFetcher {
    pub fn new(fixtures: Fixtures) -> Self {
        Self { fixtures }
    }

    pub fn from_yaml(text: &str) -> Result<Self, FixtureError> {
        Ok(Self::new(serde_yaml::from_str(text)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    async fn enter(&self, source: &str, query: &str) -> Result<(), FetchError> {
        if self.fixtures.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.fixtures.latency_ms)).await;
        }
        if self.fixtures.unavailable.iter().any(|s| s == source) {
            return Err(FetchError::Unavailable(format!("{} is unavailable", source)));
        }
        if self.fixtures.failing_queries.iter().any(|q| q == query) {
            return Err(FetchError::Http { status: 503 });
        }
        Ok(())
    }
}

/// Exact-key lookup falling back to the wildcard entry
fn lookup<'a, T>(table: &'a HashMap<String, Vec<T>>, query: &str) -> &'a [T] {
    table
        .get(query)
        .or_else(|| table.get(WILDCARD))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[async_trait]
impl SourceFetcher for FixtureFetcher {
    async fn search_people(&self, platform: &str, query: &str) -> Result<Vec<RawProfile>, FetchError> {
        self.enter(platform, query).await?;
        Ok(self
            .fixtures
            .platforms
            .get(platform)
            .map(|p| lookup(&p.search, query).to_vec())
            .unwrap_or_default())
    }

    async fn lookup_handle(&self, platform: &str, handle: &str) -> Result<Option<RawProfile>, FetchError> {
        self.enter(platform, handle).await?;
        Ok(self
            .fixtures
            .platforms
            .get(platform)
            .and_then(|p| p.handles.get(handle))
            .cloned())
    }

    async fn web_search(&self, engine: &str, query: &str) -> Result<Vec<SearchHit>, FetchError> {
        self.enter(engine, query).await?;
        Ok(self
            .fixtures
            .engines
            .get(engine)
            .map(|table| lookup(table, query).to_vec())
            .unwrap_or_default())
    }

    async fn directory_search(&self, query: &str) -> Result<Vec<RawProfile>, FetchError> {
        self.enter("directory", query).await?;
        Ok(lookup(&self.fixtures.directory, query).to_vec())
    }

    async fn news_search(&self, query: &str) -> Result<Vec<SearchHit>, FetchError> {
        self.enter("news", query).await?;
        Ok(lookup(&self.fixtures.news, query).to_vec())
    }
}
