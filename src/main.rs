//! Commodity News AI demo runner.
//! Runs one pipeline pass for the configured commodity and prints the scored headlines.
//!
//! Configuration comes from `config/app.toml` (or `$APP_CONFIG_PATH`) and the
//! environment (`COMMODITY`, `ARTICLE_COUNT`, `HF_API_TOKEN`, …); there are no flags.

use commodity_news_ai::ingest::snapshot::read_snapshot;
use commodity_news_ai::metrics::Metrics;
use commodity_news_ai::{Origin, Session, Settings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines when LOG_FORMAT=json.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ingest=info,scorer=info,pipeline=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics recorder not installed");
            None
        }
    };

    let settings = Settings::load_default()?;
    let mut session = Session::from_settings(&settings)?;
    tracing::info!(
        target: "pipeline",
        commodity = %settings.commodity,
        articles = settings.article_count,
        method = session.score_method().as_str(),
        "starting run"
    );

    let run = session.run(&settings.commodity, settings.article_count).await;
    let summary = run.summary();

    println!(
        "{} | {} articles | positive {}/{} ({:.1}%) | negative {}/{} ({:.1}%) | mean {:+.3}{}",
        run.commodity,
        summary.total,
        summary.positive,
        summary.total,
        summary.positive_pct(),
        summary.negative,
        summary.total,
        summary.negative_pct(),
        summary.mean_score,
        if run.origin == Origin::Simulated {
            " | simulated data"
        } else {
            ""
        }
    );
    for item in &run.items {
        let link = if item.has_usable_link() {
            item.item().link.as_str()
        } else {
            "link unavailable"
        };
        println!(
            "{:<8} {:+.3}  {}  <{}>",
            item.sentiment().as_str(),
            item.score(),
            item.display_title(),
            link
        );
    }

    if run.origin == Origin::Live {
        if let Some(path) = settings.fetch.snapshot_path.as_deref() {
            match read_snapshot(path) {
                Ok(saved) => tracing::info!(
                    target: "pipeline",
                    path = %path.display(),
                    count = saved.len(),
                    "snapshot saved"
                ),
                Err(e) => tracing::warn!(error = ?e, "snapshot not readable"),
            }
        }
    }

    if let Some(m) = metrics {
        tracing::debug!(target: "pipeline", metrics = %m.render(), "metrics");
    }
    Ok(())
}
