// tests/metrics_pipeline.rs
mod common;

use commodity_news_ai::ingest::fetcher::{NewsFetcher, RetryPolicy};
use commodity_news_ai::metrics::Metrics;
use commodity_news_ai::{SentimentScorer, Session};
use common::{Outcome, ScriptedProvider};
use std::time::Duration;

// Single test per binary: the recorder is process-global.
#[tokio::test]
async fn fallback_run_is_visible_in_exposition() {
    let m = Metrics::init().expect("install recorder");

    let fetcher = NewsFetcher::new(
        vec![Box::new(ScriptedProvider::always("Google News", Outcome::Status(503)))],
        RetryPolicy::new(2, Duration::ZERO),
    );
    let mut session = Session::new(Box::new(fetcher), SentimentScorer::keyword_only(Some(5)), 4);
    session.run("soybean", 3).await;

    let text = m.render();
    assert!(text.contains("news_fetch_attempts_total 2"), "{text}");
    assert!(text.contains(r#"news_fetch_failures_total{kind="status"} 2"#), "{text}");
    assert!(text.contains("news_cache_misses_total 1"), "{text}");
    assert!(text.contains("news_fallback_total 1"), "{text}");
    assert!(text.contains(r#"sentiment_scored_total{method="keyword"} 3"#), "{text}");
}
