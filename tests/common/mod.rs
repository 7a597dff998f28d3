// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use commodity_news_ai::ingest::fetcher::FeedFetcher;
use commodity_news_ai::{FetchError, NewsItem, RawItem, SourceProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const BING_CORN_XML: &str = include_str!("../fixtures/bing_corn_rss.xml");
pub const GOOGLE_WHEAT_XML: &str = include_str!("../fixtures/google_news_wheat_rss.xml");

#[derive(Clone, Debug)]
pub enum Outcome {
    Status(u16),
    Transport,
    Items(Vec<RawItem>),
}

/// Provider that plays a script of outcomes; the last one repeats.
pub struct ScriptedProvider {
    name: String,
    script: Vec<Outcome>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(name: &str, script: Vec<Outcome>) -> Self {
        Self {
            name: name.to_string(),
            script,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always(name: &str, outcome: Outcome) -> Self {
        Self::new(name, vec![outcome])
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl SourceProvider for ScriptedProvider {
    async fn fetch_raw(&self, _query: &str) -> Result<Vec<RawItem>, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script[n.min(self.script.len() - 1)].clone();
        match step {
            Outcome::Status(status) => Err(FetchError::Status {
                provider: self.name.clone(),
                status,
            }),
            Outcome::Transport => Err(FetchError::Transport {
                provider: self.name.clone(),
                message: "operation timed out".into(),
            }),
            Outcome::Items(items) => Ok(items),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fetcher that returns canned items and counts calls.
pub struct CountingFetcher {
    pub items: Vec<NewsItem>,
    pub calls: Arc<AtomicUsize>,
}

impl CountingFetcher {
    pub fn new(items: Vec<NewsItem>) -> Self {
        Self {
            items,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FeedFetcher for CountingFetcher {
    async fn fetch(&self, _query: &str, limit: usize) -> Vec<NewsItem> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.items.iter().take(limit).cloned().collect()
    }
}

pub fn raw(title: &str, link: &str) -> RawItem {
    RawItem::new(title, link)
}

pub fn news(title: &str) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        link: "https://example.com/story".to_string(),
        source: "Bing News".to_string(),
        commodity: "corn".to_string(),
        timestamp: "2024-05-01 10:00:00".to_string(),
        published: None,
    }
}
