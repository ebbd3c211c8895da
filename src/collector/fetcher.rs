//! The injected I/O capability collectors run on
//!
//! The engine never performs network calls itself. Each collector is handed
//! a [`SourceFetcher`] that owns HTTP, markup parsing and browser driving;
//! collectors only coordinate requests and turn raw hits into records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A profile as a source describes it, before scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProfile {
    pub handle: String,
    pub full_name: String,
    pub bio: String,
    pub location: String,
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
    pub verified: bool,
    pub private: bool,
    pub url: String,
    pub image_url: String,
    pub skills: Vec<String>,
    pub roles: Vec<String>,
}

/// One search-engine or news result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub date: Option<String>,
}

/// Failure of a single fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The capability itself is missing or blocked; retrying other queries is pointless
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request timed out")]
    Timeout,
}

impl FetchError {
    /// Whether the failure should abort the whole collector call
    pub fn is_structural(&self) -> bool {
        matches!(self, FetchError::Unavailable(_))
    }
}

/// Abstract fetch/query capability.
///
/// Implementations own all side effects. `platform` and `engine` are
/// lowercase source names such as `"instagram"` or `"google"`.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Run a platform's people search.
    async fn search_people(&self, platform: &str, query: &str) -> Result<Vec<RawProfile>, FetchError>;

    /// Fetch a profile by handle; `Ok(None)` when it does not exist.
    async fn lookup_handle(&self, platform: &str, handle: &str) -> Result<Option<RawProfile>, FetchError>;

    /// Run a general web search.
    async fn web_search(&self, engine: &str, query: &str) -> Result<Vec<SearchHit>, FetchError>;

    /// Search professional directories and business listings.
    async fn directory_search(&self, query: &str) -> Result<Vec<RawProfile>, FetchError>;

    /// Search news and press releases.
    async fn news_search(&self, query: &str) -> Result<Vec<SearchHit>, FetchError>;
}

/// Fetcher used when no real capability is configured.
///
/// Every call fails structurally, so every collector reports `Failed`
/// and the search returns an empty result.
#[derive(Debug, Clone, Default)]
pub struct UnavailableFetcher;

impl UnavailableFetcher {
    fn error() -> FetchError {
        FetchError::Unavailable("no fetch capability configured".into())
    }
}

#[async_trait]
impl SourceFetcher for UnavailableFetcher {
    async fn search_people(&self, _platform: &str, _query: &str) -> Result<Vec<RawProfile>, FetchError> {
        Err(Self::error())
    }

    async fn lookup_handle(&self, _platform: &str, _handle: &str) -> Result<Option<RawProfile>, FetchError> {
        Err(Self::error())
    }

    async fn web_search(&self, _engine: &str, _query: &str) -> Result<Vec<SearchHit>, FetchError> {
        Err(Self::error())
    }

    async fn directory_search(&self, _query: &str) -> Result<Vec<RawProfile>, FetchError> {
        Err(Self::error())
    }

    async fn news_search(&self, _query: &str) -> Result<Vec<SearchHit>, FetchError> {
        Err(Self::error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors() {
        assert!(FetchError::Unavailable("x".into()).is_structural());
        assert!(!FetchError::RateLimited("x".into()).is_structural());
        assert!(!FetchError::Http { status: 500 }.is_structural());
        assert!(!FetchError::Timeout.is_structural());
    }

    #[test]
    fn test_raw_profile_defaults_missing_fields() {
        let profile: RawProfile = serde_json::from_str(r#"{"handle": "jlee"}"#).unwrap();
        assert_eq!(profile.handle, "jlee");
        assert_eq!(profile.followers, 0);
        assert!(profile.skills.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_fetcher_fails_structurally() {
        let fetcher = UnavailableFetcher;
        let err = fetcher.search_people("instagram", "q").await.unwrap_err();
        assert!(err.is_structural());
        assert!(fetcher.news_search("q").await.unwrap_err().is_structural());
    }
}
