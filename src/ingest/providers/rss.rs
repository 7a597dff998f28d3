// src/ingest/providers/rss.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::FetchError;
use crate::ingest::config::SourceDef;
use crate::ingest::types::{RawItem, SourceProvider};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Placeholder in a source URL template that receives the URL-encoded query.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// RSS 2.0 search feed addressed by a URL template, e.g.
/// `https://www.bing.com/news/search?q={query}+price&format=rss`.
pub struct RssProvider {
    name: String,
    url_template: String,
    mode: Mode,
}

enum Mode {
    // Same body for every query; used by tests and offline runs.
    Fixture(String),
    Http(reqwest::Client),
}

impl RssProvider {
    pub fn from_fixture(name: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: String::new(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_source(def: &SourceDef, client: reqwest::Client) -> Self {
        Self {
            name: def.name.clone(),
            url_template: def.url.clone(),
            mode: Mode::Http(client),
        }
    }

    /// Template with the query URL-encoded into [`QUERY_PLACEHOLDER`].
    pub fn url_for(&self, query: &str) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
        self.url_template.replace(QUERY_PLACEHOLDER, &encoded)
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<RawItem>, FetchError> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).map_err(|e| FetchError::Parse {
            provider: self.name.clone(),
            message: e.to_string(),
        })?;

        let out: Vec<RawItem> = rss
            .channel
            .item
            .into_iter()
            .map(|it| RawItem {
                title: it.title,
                link: it.link,
                pub_date: it.pub_date,
            })
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("news_parse_ms").record(ms);
        counter!("news_items_parsed_total").increment(out.len() as u64);
        Ok(out)
    }

    async fn get(&self, client: &reqwest::Client, query: &str) -> Result<String, FetchError> {
        let url = self.url_for(query);
        tracing::debug!(target: "ingest", provider = %self.name, %url, "GET feed");

        let resp = client.get(&url).send().await.map_err(|e| FetchError::Transport {
            provider: self.name.clone(),
            message: e.to_string(),
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                provider: self.name.clone(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(|e| FetchError::Transport {
            provider: self.name.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_raw(&self, query: &str) -> Result<Vec<RawItem>, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http(client) => {
                let body = self.get(client, query).await?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
