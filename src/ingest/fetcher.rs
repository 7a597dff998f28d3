// src/ingest/fetcher.rs
//! Multi-source feed fetcher: sources are tried strictly in order, each with a bounded
//! number of attempts, and the first source yielding at least one accepted item wins.
//! Sources are never merged.

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{FetchConfig, Settings};
use crate::error::FetchError;
use crate::ingest::providers::{build_http_client, providers_from_sources};
use crate::ingest::types::{ItemContext, NewsItem, SourceProvider};
use crate::ingest::{normalize, snapshot};

/// Anything that can turn (query, limit) into accepted items. An empty result means
/// every source failed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, query: &str, limit: usize) -> Vec<NewsItem>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Slept between attempts of the same source, never after the last one.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Single attempt, no delay.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(cfg: &FetchConfig) -> Self {
        Self::new(cfg.attempts, Duration::from_millis(cfg.retry_delay_ms))
    }
}

pub struct NewsFetcher {
    providers: Vec<Box<dyn SourceProvider>>,
    retry: RetryPolicy,
    snapshot_path: Option<PathBuf>,
}

impl NewsFetcher {
    pub fn new(providers: Vec<Box<dyn SourceProvider>>, retry: RetryPolicy) -> Self {
        Self {
            providers,
            retry,
            snapshot_path: None,
        }
    }

    /// Persist every successful fetch to `path` (overwriting).
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.snapshot_path = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    /// HTTP RSS providers for the configured sources, sharing one client.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = build_http_client(&settings.fetch)?;
        let fetcher = Self::new(
            providers_from_sources(&settings.sources, &client),
            RetryPolicy::from(&settings.fetch),
        );
        tracing::info!(target: "ingest", sources = ?fetcher.source_names(), "feed sources ready");
        Ok(match &settings.fetch.snapshot_path {
            Some(p) => fetcher.with_snapshot(p.clone()),
            None => fetcher,
        })
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// One attempt: fetch, then filter. No accepted items counts as a failure.
    async fn attempt(
        &self,
        provider: &dyn SourceProvider,
        query: &str,
        limit: usize,
    ) -> Result<Vec<NewsItem>, FetchError> {
        let raw = provider.fetch_raw(query).await?;
        let ctx = ItemContext::now(provider.name(), query);
        let items = normalize(raw, &ctx, limit);
        if items.is_empty() {
            return Err(FetchError::Empty {
                provider: provider.name().to_string(),
            });
        }
        Ok(items)
    }

    async fn from_provider(
        &self,
        provider: &dyn SourceProvider,
        query: &str,
        limit: usize,
    ) -> Option<Vec<NewsItem>> {
        for attempt in 1..=self.retry.attempts {
            counter!("news_fetch_attempts_total").increment(1);
            match self.attempt(provider, query, limit).await {
                Ok(items) => return Some(items),
                Err(e) => {
                    tracing::warn!(
                        target: "ingest",
                        provider = provider.name(),
                        attempt,
                        kind = e.kind(),
                        network = e.is_network(),
                        error = %e,
                        "feed attempt failed"
                    );
                    counter!("news_fetch_failures_total", "kind" => e.kind()).increment(1);
                }
            }
            if attempt < self.retry.attempts && !self.retry.delay.is_zero() {
                tokio::time::sleep(self.retry.delay).await;
            }
        }
        None
    }
}

#[async_trait]
impl FeedFetcher for NewsFetcher {
    async fn fetch(&self, query: &str, limit: usize) -> Vec<NewsItem> {
        if limit == 0 {
            return Vec::new();
        }
        for provider in &self.providers {
            if let Some(items) = self.from_provider(provider.as_ref(), query, limit).await {
                tracing::info!(
                    target: "ingest",
                    provider = provider.name(),
                    query,
                    count = items.len(),
                    "feed fetched"
                );
                if let Some(path) = &self.snapshot_path {
                    if let Err(e) = snapshot::write_snapshot(path, &items) {
                        tracing::warn!(target: "ingest", error = ?e, "snapshot write failed");
                    }
                }
                return items;
            }
        }
        tracing::warn!(
            target: "ingest",
            query,
            sources = self.providers.len(),
            "all feed sources exhausted"
        );
        Vec::new()
    }
}
