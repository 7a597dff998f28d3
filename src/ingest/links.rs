// src/ingest/links.rs
//! Redirect-wrapper decoding for feed links.
//!
//! Two wrapper shapes are recognized:
//! - query-parameter redirects (`bing.com/news/apiclick.aspx?url=…`, `google.com/url?q=…`,
//!   or any link carrying an absolute `url=` parameter);
//! - Google News article ids (`news.google.com/rss/articles/<base64url>`), whose decoded
//!   payload embeds the destination URL as a length-prefixed string.
//!
//! Decoding never fails an item: callers use [`decode_link`], which falls back to the
//! original link.

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine as _};
use metrics::counter;
use url::Url;

use crate::error::LinkDecodeError;

/// base64url that accepts both padded and unpadded input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// (host suffix, path prefix, destination parameters in priority order)
const QUERY_WRAPPERS: &[(&str, &str, &[&str])] = &[
    ("bing.com", "/news/apiclick.aspx", &["url"]),
    ("bing.com", "/ck/a", &["u", "url"]),
    ("google.com", "/url", &["url", "q"]),
];

/// Path segments that precede an encoded article id on Google News.
const ARTICLE_SEGMENTS: &[&str] = &["articles", "read"];

/// Returns the destination behind a redirect wrapper, or the original link unchanged.
pub fn decode_link(link: &str) -> String {
    match try_decode_link(link) {
        Ok(dest) => {
            counter!("news_links_decoded_total").increment(1);
            dest
        }
        Err(LinkDecodeError::NotWrapped) => link.to_string(),
        Err(e) => {
            tracing::debug!(target: "ingest", error = %e, link, "keeping wrapped link");
            counter!("news_link_decode_failures_total").increment(1);
            link.to_string()
        }
    }
}

/// Strict variant of [`decode_link`]: reports why a wrapped link could not be unwrapped.
pub fn try_decode_link(link: &str) -> Result<String, LinkDecodeError> {
    let url = Url::parse(link.trim()).map_err(|_| LinkDecodeError::NotWrapped)?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

    if host_matches(&host, "news.google.com") {
        if let Some(id) = article_id(&url) {
            return decode_article_id(id);
        }
    }

    for (suffix, prefix, params) in QUERY_WRAPPERS {
        if host_matches(&host, suffix) && url.path().starts_with(prefix) {
            return params
                .iter()
                .find_map(|p| query_param(&url, p))
                .ok_or(LinkDecodeError::MissingTarget)
                .and_then(|dest| absolute_http(&dest));
        }
    }

    // Generic wrapper: any link with an absolute http(s) `url=` parameter.
    if let Some(dest) = query_param(&url, "url") {
        if let Ok(dest) = absolute_http(&dest) {
            return Ok(dest);
        }
    }

    Err(LinkDecodeError::NotWrapped)
}

fn host_matches(host: &str, suffix: &str) -> bool {
    host == suffix || host.ends_with(&format!(".{suffix}"))
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k.eq_ignore_ascii_case(name) && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

fn article_id(url: &Url) -> Option<&str> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    segments
        .windows(2)
        .find(|w| ARTICLE_SEGMENTS.contains(&w[0]) && !w[1].is_empty())
        .map(|w| w[1])
}

fn decode_article_id(id: &str) -> Result<String, LinkDecodeError> {
    let bytes = URL_SAFE_LENIENT
        .decode(id)
        .map_err(|e| LinkDecodeError::InvalidBase64(e.to_string()))?;
    let embedded = embedded_url(&bytes).ok_or(LinkDecodeError::NoEmbeddedUrl)?;
    absolute_http(embedded.trim_matches(|c: char| c == '"' || c == '\''))
}

/// Locate an http(s) URL inside a decoded article id.
///
/// The payload is protobuf-like: the URL is a length-delimited field, so the varint right
/// before it gives its exact length. When that length does not fit, the URL runs until the
/// first non-printable byte or quote.
fn embedded_url(bytes: &[u8]) -> Option<&str> {
    // First URL in the payload is the destination; later fields may carry an AMP copy.
    let start = [find(bytes, b"https://"), find(bytes, b"http://")]
        .into_iter()
        .flatten()
        .min()?;
    let tail = &bytes[start..];

    let end = prefixed_len(&bytes[..start])
        .filter(|&len| len <= tail.len() && tail[..len].iter().all(|b| b.is_ascii_graphic()))
        .unwrap_or_else(|| {
            tail.iter()
                .position(|b| !b.is_ascii_graphic() || *b == b'"' || *b == b'\'')
                .unwrap_or(tail.len())
        });

    std::str::from_utf8(&tail[..end]).ok()
}

/// Decode a one- or two-byte varint that ends exactly at the end of `head`.
fn prefixed_len(head: &[u8]) -> Option<usize> {
    match head {
        [.., low, high] if low & 0x80 != 0 && high & 0x80 == 0 => {
            Some(((low & 0x7f) as usize) | ((*high as usize) << 7))
        }
        [.., last] if last & 0x80 == 0 => Some(*last as usize),
        _ => None,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn absolute_http(candidate: &str) -> Result<String, LinkDecodeError> {
    match Url::parse(candidate) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => {
            Ok(candidate.to_string())
        }
        _ => Err(LinkDecodeError::InvalidUrl(candidate.to_string())),
    }
}
