//! Search configuration and the config file
//!
//! [`SearchConfig`] is the immutable set of options passed into every
//! search. [`FinderConfig`] adds the list of built-in collectors to register
//! and is what the config file deserializes into:
//!
//! ```yaml
//! search:
//!   max_in_flight_collectors: 4
//!   max_per_collector_budget_ms: 20000
//!   confidence_threshold: 0.2
//! collectors:
//!   - kind: platform_search
//!     platform: linkedin
//!     confidence_floor: 0.8
//!   - kind: web_mentions
//!     engine: google
//!     max_queries: 5
//! ```

use crate::collector::sources::{
    DirectoryCollector, HandleProbeCollector, NewsCollector, PlatformSearchCollector,
    WebMentionCollector,
};
use crate::collector::{Collector, CollectorRegistry, SourceFetcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Config file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Options recognized by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Collectors allowed to run at once; the rest queue for a slot
    pub max_in_flight_collectors: usize,
    /// Upper bound on one collector's time allowance
    #[serde(rename = "max_per_collector_budget_ms", with = "duration_ms")]
    pub max_per_collector_budget: Duration,
    /// Profiles below this confidence are dropped from the result
    pub confidence_threshold: f64,
    pub max_queries_per_collector: usize,
    /// Wait past a collector's budget before declaring it timed out
    #[serde(rename = "boundary_grace_ms", with = "duration_ms")]
    pub boundary_grace: Duration,
    /// Deadline used when the caller does not pass one
    #[serde(rename = "global_deadline_ms", with = "duration_ms")]
    pub global_deadline: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_in_flight_collectors: 10,
            max_per_collector_budget: Duration::from_secs(30),
            confidence_threshold: 0.0,
            max_queries_per_collector: 5,
            boundary_grace: Duration::from_millis(250),
            global_deadline: Duration::from_secs(60),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight_collectors = limit;
        self
    }

    pub fn with_per_collector_budget(mut self, budget: Duration) -> Self {
        self.max_per_collector_budget = budget;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_max_queries_per_collector(mut self, max_queries: usize) -> Self {
        self.max_queries_per_collector = max_queries;
        self
    }

    pub fn with_boundary_grace(mut self, grace: Duration) -> Self {
        self.boundary_grace = grace;
        self
    }

    pub fn with_global_deadline(mut self, deadline: Duration) -> Self {
        self.global_deadline = deadline;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_in_flight_collectors == 0 {
            return Err(ConfigError::Invalid(
                "max_in_flight_collectors must be at least 1".into(),
            ));
        }
        if self.max_queries_per_collector == 0 {
            return Err(ConfigError::Invalid(
                "max_queries_per_collector must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold {} is outside [0, 1]",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

/// One built-in collector to register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectorSpec {
    PlatformSearch {
        platform: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_queries: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence_floor: Option<f64>,
    },
    HandleProbe {
        platform: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_probes: Option<usize>,
    },
    WebMentions {
        engine: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_queries: Option<usize>,
    },
    Directory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_queries: Option<usize>,
    },
    News {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_queries: Option<usize>,
    },
}

impl CollectorSpec {
    pub fn platform_search(platform: &str) -> Self {
        CollectorSpec::PlatformSearch {
            platform: platform.to_string(),
            max_queries: None,
            confidence_floor: None,
        }
    }

    /// Build the collector over a fetch capability
    pub fn build(&self, fetcher: Arc<dyn SourceFetcher>) -> Arc<dyn Collector> {
        match self {
            CollectorSpec::PlatformSearch {
                platform,
                max_queries,
                confidence_floor,
            } => {
                let mut collector = PlatformSearchCollector::new(platform.as_str(), fetcher);
                if let Some(max) = max_queries {
                    collector = collector.with_max_queries(*max);
                }
                if let Some(floor) = confidence_floor {
                    collector = collector.with_confidence_floor(*floor);
                }
                Arc::new(collector)
            }
            CollectorSpec::HandleProbe {
                platform,
                max_probes,
            } => {
                let mut collector = HandleProbeCollector::new(platform.as_str(), fetcher);
                if let Some(max) = max_probes {
                    collector = collector.with_max_probes(*max);
                }
                Arc::new(collector)
            }
            CollectorSpec::WebMentions {
                engine,
                max_queries,
            } => {
                let mut collector = WebMentionCollector::new(engine.as_str(), fetcher);
                if let Some(max) = max_queries {
                    collector = collector.with_max_queries(*max);
                }
                Arc::new(collector)
            }
            CollectorSpec::Directory { max_queries } => {
                let mut collector = DirectoryCollector::new(fetcher);
                if let Some(max) = max_queries {
                    collector = collector.with_max_queries(*max);
                }
                Arc::new(collector)
            }
            CollectorSpec::News { max_queries } => {
                let mut collector = NewsCollector::new(fetcher);
                if let Some(max) = max_queries {
                    collector = collector.with_max_queries(*max);
                }
                Arc::new(collector)
            }
        }
    }
}

/// Everything the config file holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    pub search: SearchConfig,
    pub collectors: Vec<CollectorSpec>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            collectors: default_collectors(),
        }
    }
}

/// Platform search for the major networks, an Instagram handle probe,
/// two search engines, directories and news
fn default_collectors() -> Vec<CollectorSpec> {
    vec![
        CollectorSpec::platform_search("instagram"),
        CollectorSpec::PlatformSearch {
            platform: "linkedin".into(),
            max_queries: None,
            confidence_floor: Some(0.8),
        },
        CollectorSpec::platform_search("twitter"),
        CollectorSpec::platform_search("facebook"),
        CollectorSpec::platform_search("github"),
        CollectorSpec::HandleProbe {
            platform: "instagram".into(),
            max_probes: None,
        },
        CollectorSpec::WebMentions {
            engine: "google".into(),
            max_queries: None,
        },
        CollectorSpec::WebMentions {
            engine: "duckduckgo".into(),
            max_queries: None,
        },
        CollectorSpec::Directory { max_queries: None },
        CollectorSpec::News { max_queries: None },
    ]
}

impl FinderConfig {
    /// Parse and validate YAML config text
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: FinderConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file that must exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Load `path` if given, else the default location; defaults when that file is missing
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        for spec in &self.collectors {
            if let CollectorSpec::PlatformSearch {
                platform,
                confidence_floor: Some(floor),
                ..
            } = spec
            {
                if !(0.0..=1.0).contains(floor) {
                    return Err(ConfigError::Invalid(format!(
                        "confidence_floor {} for {} is outside [0, 1]",
                        floor, platform
                    )));
                }
            }
        }
        Ok(())
    }

    /// Register every configured collector over one fetch capability
    pub fn build_registry(&self, fetcher: Arc<dyn SourceFetcher>) -> CollectorRegistry {
        let mut registry = CollectorRegistry::new();
        for spec in &self.collectors {
            registry.register_shared(spec.build(fetcher.clone()));
        }
        registry
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// `<config_dir>/person-finder/config.yaml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("person-finder").join("config.yaml"))
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
