// tests/settings_load.rs
use commodity_news_ai::config::{
    Settings, ENV_APP_CONFIG_PATH, ENV_ARTICLE_COUNT, ENV_COMMODITY, MAX_ARTICLES,
};
use commodity_news_ai::ingest::config::{default_sources, load_sources_from, SourceDef};
use serial_test::serial;
use std::{env, fs};

const SOURCES_ENV: &str = "INGEST_SOURCES_PATH";

fn clear_env() {
    for k in [ENV_APP_CONFIG_PATH, ENV_COMMODITY, ENV_ARTICLE_COUNT, SOURCES_ENV] {
        env::remove_var(k);
    }
}

#[test]
#[serial]
fn file_then_sources_then_env_overrides() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("app.toml");
    fs::write(
        &app,
        r#"
commodity = "corn"
commodities = ["corn", "wheat", "cocoa"]
article_count = 4

[fetch]
attempts = 1
snapshot_path = "out/latest.json"

[scorer]
enabled = false
seed = 11
"#,
    )
    .unwrap();
    let sources = dir.path().join("sources.json");
    fs::write(
        &sources,
        r#"[{"name":"Bing News","url":"https://www.bing.com/news/search?q={query}&format=rss"}]"#,
    )
    .unwrap();

    env::set_var(ENV_APP_CONFIG_PATH, &app);
    env::set_var(SOURCES_ENV, &sources);
    env::set_var(ENV_COMMODITY, " Cocoa ");
    env::set_var(ENV_ARTICLE_COUNT, "99");

    let s = Settings::load_default().unwrap();
    clear_env();

    assert_eq!(s.commodity, "cocoa");
    assert_eq!(s.article_count, MAX_ARTICLES);
    assert_eq!(s.fetch.attempts, 1);
    assert_eq!(
        s.fetch.snapshot_path.as_deref(),
        Some(std::path::Path::new("out/latest.json"))
    );
    assert!(!s.scorer.enabled);
    assert_eq!(s.scorer.seed, Some(11));
    assert_eq!(s.sources.len(), 1);
    assert_eq!(s.sources[0].name, "Bing News");
}

#[test]
#[serial]
fn missing_config_file_is_a_hard_error() {
    clear_env();
    env::set_var(ENV_APP_CONFIG_PATH, "/definitely/not/here/app.toml");
    let err = Settings::load_default().unwrap_err();
    clear_env();
    assert!(format!("{err:#}").contains("reading settings"));
}

#[test]
#[serial]
fn commodity_outside_list_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("app.toml");
    fs::write(&app, "commodity = \"gold\"\n").unwrap();
    env::set_var(ENV_APP_CONFIG_PATH, &app);
    let err = Settings::load_default().unwrap_err();
    assert!(err.to_string().contains("not one of"), "{err:#}");
    clear_env();
}

#[test]
fn toml_source_list_is_cleaned() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("ingest_sources.toml");
    fs::write(
        &p,
        r#"
sources = [
  { name = " Google News ", url = "https://news.google.com/rss/search?q={query}" },
  { name = "", url = "https://ignored.example/?q={query}" },
  { name = "google news", url = "https://dup.example/?q={query}" },
]
"#,
    )
    .unwrap();
    let list = load_sources_from(&p).unwrap();
    assert_eq!(
        list,
        vec![SourceDef::new(
            "Google News",
            "https://news.google.com/rss/search?q={query}"
        )]
    );
}

#[test]
fn source_without_placeholder_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("ingest_sources.json");
    fs::write(&p, r#"[{"name":"Static","url":"https://example.com/feed.xml"}]"#).unwrap();
    assert!(load_sources_from(&p).is_err());
}

#[test]
fn defaults_try_google_before_bing() {
    let names: Vec<String> = default_sources().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Google News", "Bing News"]);
}
