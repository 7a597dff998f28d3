use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series carry descriptions once a recorder exists).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_fetch_attempts_total", "Feed fetch attempts across sources.");
        describe_counter!(
            "news_fetch_failures_total",
            "Failed feed attempts, labeled by kind (status, transport, parse, empty)."
        );
        describe_counter!("news_items_parsed_total", "Raw items parsed from feeds.");
        describe_counter!("news_items_kept_total", "Items accepted by the filter.");
        describe_counter!(
            "news_items_filtered_total",
            "Items dropped by the filter, labeled by reason."
        );
        describe_counter!("news_links_decoded_total", "Redirect links unwrapped.");
        describe_counter!(
            "news_link_decode_failures_total",
            "Wrapped links kept as-is because decoding failed."
        );
        describe_counter!("news_cache_hits_total", "Fetch cache hits.");
        describe_counter!("news_cache_misses_total", "Fetch cache misses.");
        describe_counter!(
            "news_fallback_total",
            "Runs that fell back to the simulated item set."
        );
        describe_counter!(
            "sentiment_scored_total",
            "Titles scored, labeled by method (model, keyword)."
        );
        describe_counter!("sentiment_errors_total", "Classifier calls that failed.");
        describe_histogram!("news_parse_ms", "Feed parse time in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder globally and describe all series.
    pub fn init() -> Result<Self, BuildError> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Prometheus exposition text of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
