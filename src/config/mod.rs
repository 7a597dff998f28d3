// src/config/mod.rs
//! Application settings: TOML file + env overrides.

pub mod scorer;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::config::{default_sources, SourceDef};
pub use scorer::ScorerConfig;

// --- env defaults & names ---
pub const DEFAULT_APP_CONFIG_PATH: &str = "config/app.toml";
pub const ENV_APP_CONFIG_PATH: &str = "APP_CONFIG_PATH";
pub const ENV_COMMODITY: &str = "COMMODITY";
pub const ENV_ARTICLE_COUNT: &str = "ARTICLE_COUNT";

pub const MIN_ARTICLES: usize = 1;
pub const MAX_ARTICLES: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchConfig {
    /// Tries per source before moving on.
    pub attempts: u32,
    /// Pause between two tries of the same source; 0 disables it.
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub user_agent: String,
    pub accept_language: String,
    /// JSON snapshot of the last successful fetch; `None` or an empty path disables it.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            retry_delay_ms: 1_000,
            timeout_ms: 10_000,
            connect_timeout_ms: 4_000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            accept_language: "en-US,en;q=0.9".into(),
            snapshot_path: Some(PathBuf::from("scraped_articles.json")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Max cached (query, count, generation) keys before LRU eviction.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Selected commodity; must be one of `commodities`.
    pub commodity: String,
    pub commodities: Vec<String>,
    pub article_count: usize,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub sources: Vec<SourceDef>,
    pub scorer: ScorerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            commodity: "corn".into(),
            commodities: ["corn", "wheat", "soybean", "coffee"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            article_count: 5,
            fetch: FetchConfig::default(),
            cache: CacheConfig::default(),
            sources: default_sources(),
            scorer: ScorerConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing settings toml")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// $APP_CONFIG_PATH, else config/app.toml, else defaults; then an optional source
    /// list file, env overrides, and validation.
    pub fn load_default() -> Result<Self> {
        let mut settings = match std::env::var(ENV_APP_CONFIG_PATH) {
            Ok(p) => Self::load_from(Path::new(&p))?,
            Err(_) => {
                let p = PathBuf::from(DEFAULT_APP_CONFIG_PATH);
                if p.exists() {
                    Self::load_from(&p)?
                } else {
                    Self::default()
                }
            }
        };
        if let Some(sources) = crate::ingest::config::load_sources_default()? {
            settings.sources = sources;
        }
        settings.apply_env_overrides()?;
        settings.validate()
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(c) = std::env::var(ENV_COMMODITY) {
            self.commodity = c;
        }
        if let Ok(n) = std::env::var(ENV_ARTICLE_COUNT) {
            self.article_count = n
                .trim()
                .parse()
                .with_context(|| format!("{ENV_ARTICLE_COUNT} must be an integer, got {n:?}"))?;
        }
        Ok(())
    }

    /// Normalizes the commodity, clamps the article count, and checks the rest.
    pub fn validate(mut self) -> Result<Self> {
        self.commodity = self.commodity.trim().to_lowercase();
        if !self
            .commodities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&self.commodity))
        {
            bail!(
                "commodity {:?} is not one of {:?}",
                self.commodity,
                self.commodities
            );
        }
        self.article_count = clamp_article_count(self.article_count);
        if self.fetch.attempts == 0 {
            bail!("fetch.attempts must be at least 1");
        }
        if self.fetch.timeout_ms == 0 || self.fetch.connect_timeout_ms == 0 {
            bail!("fetch.timeout_ms and fetch.connect_timeout_ms must be positive");
        }
        if self.scorer.timeout_ms == 0 || self.scorer.connect_timeout_ms == 0 {
            bail!("scorer.timeout_ms and scorer.connect_timeout_ms must be positive");
        }
        if self.sources.is_empty() {
            self.sources = default_sources();
        }
        Ok(self)
    }
}

/// Requested article count limited to 1..=20.
pub fn clamp_article_count(n: usize) -> usize {
    n.clamp(MIN_ARTICLES, MAX_ARTICLES)
}
