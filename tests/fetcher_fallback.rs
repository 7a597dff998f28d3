// tests/fetcher_fallback.rs
mod common;

use commodity_news_ai::ingest::fetcher::{FeedFetcher, NewsFetcher, RetryPolicy};
use commodity_news_ai::ingest::snapshot::read_snapshot;
use common::{raw, Outcome, ScriptedProvider};
use std::sync::atomic::Ordering;
use std::time::Duration;

fn corn_items() -> Vec<commodity_news_ai::RawItem> {
    vec![
        raw("Corn futures rise as export demand strengthens", "https://a.example/1"),
        raw("Short one", "https://a.example/2"),
        raw("Brazil corn crop estimate trimmed after dry spell", "https://a.example/3"),
    ]
}

#[tokio::test]
async fn first_source_with_items_wins_and_later_sources_untouched() {
    let first = ScriptedProvider::always("Google News", Outcome::Items(corn_items()));
    let second = ScriptedProvider::always("Bing News", Outcome::Items(corn_items()));
    let (c1, c2) = (first.counter(), second.counter());

    let fetcher = NewsFetcher::new(
        vec![Box::new(first), Box::new(second)],
        RetryPolicy::new(3, Duration::ZERO),
    );
    let items = fetcher.fetch("corn", 5).await;

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.source == "Google News"));
    assert_eq!(c1.load(Ordering::SeqCst), 1);
    assert_eq!(c2.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn all_sources_failing_returns_empty_after_every_attempt() {
    let first = ScriptedProvider::always("Google News", Outcome::Status(503));
    let second = ScriptedProvider::always("Bing News", Outcome::Transport);
    let (c1, c2) = (first.counter(), second.counter());

    let fetcher = NewsFetcher::new(
        vec![Box::new(first), Box::new(second)],
        RetryPolicy::new(3, Duration::ZERO),
    );
    assert_eq!(fetcher.source_names(), vec!["Google News", "Bing News"]);
    let items = fetcher.fetch("wheat", 3).await;

    assert!(items.is_empty());
    assert_eq!(c1.load(Ordering::SeqCst), 3);
    assert_eq!(c2.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_recovers_within_the_same_source() {
    let first = ScriptedProvider::new(
        "Google News",
        vec![
            Outcome::Status(503),
            Outcome::Transport,
            Outcome::Items(corn_items()),
        ],
    );
    let second = ScriptedProvider::always("Bing News", Outcome::Items(corn_items()));
    let (c1, c2) = (first.counter(), second.counter());

    let fetcher = NewsFetcher::new(
        vec![Box::new(first), Box::new(second)],
        RetryPolicy::new(3, Duration::from_millis(5)),
    );
    let items = fetcher.fetch("corn", 5).await;

    assert_eq!(items.len(), 2);
    assert_eq!(c1.load(Ordering::SeqCst), 3);
    assert_eq!(c2.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_after_filtering_moves_to_next_source() {
    let junk = vec![
        raw("Corn video", "https://a.example/v"),
        raw("Watch the corn market open with our analysts", "https://a.example/w"),
    ];
    let first = ScriptedProvider::always("Google News", Outcome::Items(junk));
    let second = ScriptedProvider::always("Bing News", Outcome::Items(corn_items()));
    let c1 = first.counter();

    let fetcher = NewsFetcher::new(
        vec![Box::new(first), Box::new(second)],
        RetryPolicy::new(2, Duration::ZERO),
    );
    let items = fetcher.fetch("corn", 5).await;

    assert_eq!(c1.load(Ordering::SeqCst), 2);
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.source == "Bing News"));
}

#[tokio::test]
async fn zero_limit_does_not_touch_sources() {
    let first = ScriptedProvider::always("Google News", Outcome::Items(corn_items()));
    let c1 = first.counter();
    let fetcher = NewsFetcher::new(vec![Box::new(first)], RetryPolicy::once());

    assert!(fetcher.fetch("corn", 0).await.is_empty());
    assert_eq!(c1.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_fetch_overwrites_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("scraped_articles.json");

    let fetcher = NewsFetcher::new(
        vec![Box::new(ScriptedProvider::always(
            "Google News",
            Outcome::Items(corn_items()),
        ))],
        RetryPolicy::once(),
    )
    .with_snapshot(&path);

    let items = fetcher.fetch("corn", 1).await;
    assert_eq!(read_snapshot(&path).unwrap(), items);

    let items = fetcher.fetch("corn", 2).await;
    let saved = read_snapshot(&path).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved, items);
}

#[tokio::test]
async fn failed_fetch_leaves_no_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scraped_articles.json");

    let fetcher = NewsFetcher::new(
        vec![Box::new(ScriptedProvider::always(
            "Google News",
            Outcome::Status(503),
        ))],
        RetryPolicy::once(),
    )
    .with_snapshot(&path);

    assert!(fetcher.fetch("corn", 3).await.is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn snapshot_write_failure_does_not_fail_the_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"plain file").unwrap();
    let path = blocker.join("scraped_articles.json");

    let fetcher = NewsFetcher::new(
        vec![Box::new(ScriptedProvider::always(
            "Google News",
            Outcome::Items(corn_items()),
        ))],
        RetryPolicy::once(),
    )
    .with_snapshot(&path);

    let items = fetcher.fetch("corn", 1).await;
    assert_eq!(items.len(), 1);
    assert!(!path.exists());
}
