// src/ingest/fallback.rs
use crate::ingest::types::{ItemContext, NewsItem, SIMULATED_SOURCE};

/// Placeholder headlines used when every feed source failed, truncated to `limit`.
pub fn simulated_items(commodity: &str, limit: usize) -> Vec<NewsItem> {
    let c = commodity.trim().to_lowercase();
    let ctx = ItemContext::now(SIMULATED_SOURCE, &c);
    let rows = [
        (
            format!("{} prices fall due to strong harvest", title_case(&c)),
            "https://reuters.com",
        ),
        (format!("Brazil boosts {c} exports"), "https://bloomberg.com"),
        (format!("EU imposes new tariffs on {c}"), "https://euronews.com"),
    ];

    rows.into_iter()
        .take(limit)
        .map(|(title, link)| NewsItem {
            title,
            link: link.to_string(),
            source: ctx.source.clone(),
            commodity: ctx.commodity.clone(),
            timestamp: ctx.timestamp.clone(),
            published: None,
        })
        .collect()
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
