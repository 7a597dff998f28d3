// src/ingest/cache.rs
//! Fetch result cache keyed by (query, limit, generation).
//!
//! Exact-key lookups only. A new generation (advanced by the caller) never sees the
//! entries of an older one. Entries never expire on their own; the key count is capped
//! and the least recently used key is evicted first.

use metrics::counter;
use std::collections::{HashMap, VecDeque};

use crate::ingest::fetcher::FeedFetcher;
use crate::ingest::types::NewsItem;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub limit: usize,
    pub generation: u64,
}

impl CacheKey {
    pub fn new(query: &str, limit: usize, generation: u64) -> Self {
        Self {
            query: query.to_string(),
            limit,
            generation,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub struct ResultCache {
    capacity: usize,
    entries: HashMap<CacheKey, Vec<NewsItem>>,
    // front = least recently used
    order: VecDeque<CacheKey>,
    stats: CacheStats,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Cached items for `key`, marking it most recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<Vec<NewsItem>> {
        let items = self.entries.get(key)?.clone();
        self.touch(key);
        Some(items)
    }

    /// Store `items` under `key` (empty sequences included), evicting the LRU key if full.
    pub fn insert(&mut self, key: CacheKey, items: Vec<NewsItem>) {
        if self.entries.contains_key(&key) {
            self.touch(&key);
        } else {
            while self.entries.len() >= self.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
                self.stats.evictions += 1;
                tracing::debug!(
                    target: "cache",
                    query = %oldest.query,
                    generation = oldest.generation,
                    "evicted"
                );
            }
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, items);
    }

    /// Hit: cached items, no I/O. Miss: one call to `fetcher`, result stored even when empty
    /// so a failing query is not retried within the same generation.
    pub async fn get_or_fetch<F>(
        &mut self,
        fetcher: &F,
        query: &str,
        limit: usize,
        generation: u64,
    ) -> Vec<NewsItem>
    where
        F: FeedFetcher + ?Sized,
    {
        let key = CacheKey::new(query, limit, generation);
        if let Some(items) = self.get(&key) {
            self.stats.hits += 1;
            counter!("news_cache_hits_total").increment(1);
            tracing::debug!(target: "cache", query, limit, generation, "hit");
            return items;
        }

        self.stats.misses += 1;
        counter!("news_cache_misses_total").increment(1);
        tracing::debug!(target: "cache", query, limit, generation, "miss");

        let items = fetcher.fetch(query, limit).await;
        self.insert(key, items.clone());
        items
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}
