// src/ingest/providers/mod.rs
pub mod rss;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;

use crate::config::FetchConfig;
use crate::ingest::config::SourceDef;
use crate::ingest::types::SourceProvider;

/// Shared HTTP client for feed requests: fixed User-Agent/Accept-Language and explicit timeouts.
pub fn build_http_client(cfg: &FetchConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&cfg.accept_language).context("invalid accept_language header")?,
    );
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .default_headers(headers)
        .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
        .timeout(Duration::from_millis(cfg.timeout_ms))
        .build()
        .context("building feed http client")
}

/// One RSS provider per source definition, in the given order.
pub fn providers_from_sources(
    sources: &[SourceDef],
    client: &reqwest::Client,
) -> Vec<Box<dyn SourceProvider>> {
    sources
        .iter()
        .map(|def| {
            Box::new(rss::RssProvider::from_source(def, client.clone())) as Box<dyn SourceProvider>
        })
        .collect()
}
