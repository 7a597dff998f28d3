// src/ingest/types.rs
use crate::error::FetchError;
use serde::{Deserialize, Serialize};

/// Source tag carried by items from the synthetic fallback set.
pub const SIMULATED_SOURCE: &str = "Simulated";

/// One accepted news headline. Immutable once produced by the fetcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub source: String,    // e.g., "Google News", "Bing News", "Simulated"
    pub commodity: String, // query term the item was fetched for
    pub timestamp: String, // fetch time, "%Y-%m-%d %H:%M:%S" UTC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>, // pubDate as RFC 3339 when parseable
}

impl NewsItem {
    pub fn is_simulated(&self) -> bool {
        self.source == SIMULATED_SOURCE
    }
}

/// Item as it comes out of a feed, before filtering and link decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
}

impl RawItem {
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            link: Some(link.to_string()),
            pub_date: None,
        }
    }
}

/// Per-fetch values stamped onto every item accepted by `normalize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemContext {
    pub source: String,
    pub commodity: String,
    pub timestamp: String,
}

impl ItemContext {
    /// Context stamped with the current UTC time.
    pub fn now(source: &str, commodity: &str) -> Self {
        Self {
            source: source.to_string(),
            commodity: commodity.to_string(),
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One feed endpoint. Each call is a single attempt; retries live in the fetcher.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_raw(&self, query: &str) -> Result<Vec<RawItem>, FetchError>;
    fn name(&self) -> &str;
}
