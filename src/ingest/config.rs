// src/ingest/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "INGEST_SOURCES_PATH";

/// One feed endpoint: display name (also the item source tag) and URL template
/// containing `{query}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDef {
    pub name: String,
    pub url: String,
}

impl SourceDef {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Built-in source order: Google News search first, Bing News search second.
pub fn default_sources() -> Vec<SourceDef> {
    vec![
        SourceDef::new(
            "Google News",
            "https://news.google.com/rss/search?q={query}+price&hl=en-US&gl=US&ceid=US:en",
        ),
        SourceDef::new(
            "Bing News",
            "https://www.bing.com/news/search?q={query}+price&format=rss",
        ),
    ]
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceDef>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load sources using env var + fallbacks:
/// 1) $INGEST_SOURCES_PATH
/// 2) config/ingest_sources.toml
/// 3) config/ingest_sources.json
///
/// Returns `None` when nothing is configured on disk.
pub fn load_sources_default() -> Result<Option<Vec<SourceDef>>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb).map(Some);
        } else {
            return Err(anyhow!("INGEST_SOURCES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/ingest_sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p).map(Some);
    }
    let json_p = PathBuf::from("config/ingest_sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p).map(Some);
    }
    Ok(None)
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceDef>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]") || s.contains("sources =");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return clean_list(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return clean_list(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return clean_list(v);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<SourceDef>> {
    #[derive(Deserialize)]
    struct TomlSources {
        sources: Vec<SourceDef>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(v.sources)
}

fn parse_json(s: &str) -> Result<Vec<SourceDef>> {
    Ok(serde_json::from_str(s)?)
}

/// Trim names/urls, drop blank entries and repeated names (first one wins).
/// Every remaining URL must carry the `{query}` placeholder.
fn clean_list(items: Vec<SourceDef>) -> Result<Vec<SourceDef>> {
    let mut out: Vec<SourceDef> = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim();
        let url = it.url.trim();
        if name.is_empty() || url.is_empty() {
            continue;
        }
        if out.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            continue;
        }
        if !url.contains(super::providers::rss::QUERY_PLACEHOLDER) {
            bail!("source {name:?} has no {{query}} placeholder in its url");
        }
        out.push(SourceDef::new(name, url));
    }
    if out.is_empty() {
        bail!("no usable sources configured");
    }
    Ok(out)
}
