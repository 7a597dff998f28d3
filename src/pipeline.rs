// src/pipeline.rs
//! Fetch → filter → cache → score, driven by an explicit `Session`.
//!
//! The session owns everything a run needs: the fetcher, the result cache, the
//! generation counter and the scorer. A run never fails; when every source is
//! exhausted it falls back to the simulated item set.

use anyhow::Result;
use metrics::counter;
use serde::Serialize;

use crate::config::{clamp_article_count, Settings};
use crate::ingest::cache::{CacheStats, ResultCache};
use crate::ingest::fallback::simulated_items;
use crate::ingest::fetcher::{FeedFetcher, NewsFetcher};
use crate::sentiment::{ScoreMethod, ScoredItem, Sentiment, SentimentScorer};

/// Where a run's items came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Origin {
    Live,
    Simulated,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub commodity: String,
    pub generation: u64,
    pub origin: Origin,
    pub items: Vec<ScoredItem>,
}

impl PipelineRun {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_items(&self.items)
    }
}

/// Counts per label plus mean score over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub errors: usize,
    pub mean_score: f64,
}

impl RunSummary {
    pub fn from_items(items: &[ScoredItem]) -> Self {
        let mut s = Self {
            total: items.len(),
            ..Self::default()
        };
        for it in items {
            match it.sentiment() {
                Sentiment::Positive => s.positive += 1,
                Sentiment::Negative => s.negative += 1,
                Sentiment::Neutral => s.neutral += 1,
                Sentiment::Error => s.errors += 1,
            }
        }
        if s.total > 0 {
            s.mean_score = items.iter().map(|i| i.score()).sum::<f64>() / s.total as f64;
        }
        s
    }

    /// Share of positive items in percent, rounded to one decimal.
    pub fn positive_pct(&self) -> f64 {
        pct(self.positive, self.total)
    }

    /// Share of negative items in percent, rounded to one decimal.
    pub fn negative_pct(&self) -> f64 {
        pct(self.negative, self.total)
    }
}

fn pct(n: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (n as f64 / total as f64 * 1000.0).round() / 10.0
}

pub struct Session {
    fetcher: Box<dyn FeedFetcher>,
    cache: ResultCache,
    generation: u64,
    scorer: SentimentScorer,
}

impl Session {
    pub fn new(
        fetcher: Box<dyn FeedFetcher>,
        scorer: SentimentScorer,
        cache_capacity: usize,
    ) -> Self {
        Self {
            fetcher,
            cache: ResultCache::new(cache_capacity),
            generation: 0,
            scorer,
        }
    }

    /// HTTP fetcher over the configured sources, model scorer (or keyword fallback).
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let fetcher = NewsFetcher::from_settings(settings)?;
        Ok(Self::new(
            Box::new(fetcher),
            SentimentScorer::from_config(&settings.scorer),
            settings.cache.capacity,
        ))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new generation so the next run fetches fresh results.
    pub fn advance_generation(&mut self) -> u64 {
        self.generation += 1;
        tracing::info!(target: "pipeline", generation = self.generation, "generation advanced");
        self.generation
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn score_method(&self) -> ScoreMethod {
        self.scorer.method()
    }

    /// Cached-or-fetched items for the current generation, without fallback or scoring.
    pub async fn news(&mut self, commodity: &str, limit: usize) -> Vec<crate::NewsItem> {
        let query = commodity.trim().to_lowercase();
        self.cache
            .get_or_fetch(self.fetcher.as_ref(), &query, limit, self.generation)
            .await
    }

    /// One full run for `commodity` with `limit` clamped to 1..=20.
    pub async fn run(&mut self, commodity: &str, limit: usize) -> PipelineRun {
        let limit = clamp_article_count(limit);
        let query = commodity.trim().to_lowercase();
        let fetched = self.news(&query, limit).await;

        let (origin, items) = if fetched.is_empty() {
            tracing::warn!(
                target: "pipeline",
                commodity = %query,
                "no live items, using simulated set"
            );
            counter!("news_fallback_total").increment(1);
            (Origin::Simulated, simulated_items(&query, limit))
        } else {
            (Origin::Live, fetched)
        };

        let items = self.scorer.score_all(items).await;
        let run = PipelineRun {
            commodity: query,
            generation: self.generation,
            origin,
            items,
        };
        let summary = run.summary();
        tracing::info!(
            target: "pipeline",
            commodity = %run.commodity,
            generation = run.generation,
            origin = ?run.origin,
            total = summary.total,
            positive = summary.positive,
            negative = summary.negative,
            "run finished"
        );
        run
    }
}
