// src/ingest/mod.rs
pub mod cache;
pub mod config;
pub mod fallback;
pub mod fetcher;
pub mod links;
pub mod providers;
pub mod snapshot;
pub mod types;

use crate::ingest::types::{ItemContext, NewsItem, RawItem};
use metrics::counter;
use std::collections::HashSet;

/// Titles shorter than this (in chars) are dropped as low-quality.
pub const MIN_TITLE_CHARS: usize = 25;

/// Lowercased substrings that mark non-article items (clips, streams, shows).
pub const DISALLOWED_KEYWORDS: &[&str] = &["video", "watch", "live", "youtube", "podcast"];

const MAX_TITLE_CHARS: usize = 500;

/// Normalize headline text: unescape, strip tags, fold quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if out.chars().count() > MAX_TITLE_CHARS {
        out = out.chars().take(MAX_TITLE_CHARS).collect();
    }

    out
}

/// Case-insensitive substring check against [`DISALLOWED_KEYWORDS`].
pub fn has_disallowed_keyword(title: &str) -> bool {
    let t = title.to_lowercase();
    DISALLOWED_KEYWORDS.iter().any(|k| t.contains(k))
}

/// Why `normalize` rejected an item. Only used for logs and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Missing,
    TooShort,
    Keyword,
    Duplicate,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::TooShort => "too_short",
            Self::Keyword => "keyword",
            Self::Duplicate => "duplicate",
        }
    }
}

/// (title, decoded link, raw pubDate)
type Accepted = (String, String, Option<String>);

fn screen(raw: RawItem, seen: &mut HashSet<String>) -> Result<Accepted, Rejection> {
    let title = raw.title.as_deref().map(normalize_text).unwrap_or_default();
    let link = raw.link.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() || link.is_empty() {
        return Err(Rejection::Missing);
    }
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(Rejection::TooShort);
    }
    if has_disallowed_keyword(&title) {
        return Err(Rejection::Keyword);
    }
    if !seen.insert(title.to_lowercase()) {
        return Err(Rejection::Duplicate);
    }
    Ok((title, links::decode_link(link), raw.pub_date))
}

/// Filter raw feed items into accepted `NewsItem`s, in source order, capped at `limit`.
///
/// Pure apart from counters: drops items with a missing title or link, titles under
/// [`MIN_TITLE_CHARS`], titles containing a disallowed keyword, and repeated titles.
/// Redirect-wrapped links are unwrapped; undecodable ones are kept as-is.
pub fn normalize(raw_items: Vec<RawItem>, ctx: &ItemContext, limit: usize) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(limit.min(raw_items.len()));

    for raw in raw_items {
        if out.len() >= limit {
            break;
        }
        match screen(raw, &mut seen) {
            Ok((title, link, pub_date)) => out.push(NewsItem {
                title,
                link,
                source: ctx.source.clone(),
                commodity: ctx.commodity.clone(),
                timestamp: ctx.timestamp.clone(),
                published: pub_date.as_deref().and_then(rfc2822_to_rfc3339),
            }),
            Err(reason) => {
                tracing::trace!(target: "ingest", reason = reason.as_str(), "item dropped");
                counter!("news_items_filtered_total", "reason" => reason.as_str()).increment(1);
            }
        }
    }

    counter!("news_items_kept_total").increment(out.len() as u64);
    out
}

/// `pubDate` (RFC 2822) → RFC 3339, `None` when unparseable.
pub fn rfc2822_to_rfc3339(ts: &str) -> Option<String> {
    use time::format_description::well_known::{Rfc2822, Rfc3339};
    use time::{OffsetDateTime, UtcOffset};

    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC))
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
