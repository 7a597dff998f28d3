// src/error.rs
//! Failure taxonomy for the fetch → filter → score pipeline.
//!
//! None of these are fatal to a run: fetch failures move on to the next
//! attempt or source, link failures keep the original link, and classifier
//! failures turn into an `Error` sentiment for that single item.

use thiserror::Error;

/// Why a single attempt against one feed source failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{provider} answered with HTTP {status}")]
    Status { provider: String, status: u16 },

    #[error("{provider} transport error: {message}")]
    Transport { provider: String, message: String },

    #[error("{provider} feed could not be parsed: {message}")]
    Parse { provider: String, message: String },

    #[error("{provider} feed had no usable items")]
    Empty { provider: String },
}

impl FetchError {
    /// Stable label used in logs and as the metrics `kind` label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Transport { .. } => "transport",
            Self::Parse { .. } => "parse",
            Self::Empty { .. } => "empty",
        }
    }

    /// Network-class failures (status, transport) as opposed to feed content failures.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Transport { .. })
    }
}

/// Why a redirect-wrapped link could not be unwrapped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkDecodeError {
    #[error("link is not a known redirect wrapper")]
    NotWrapped,

    #[error("redirect wrapper has no destination parameter")]
    MissingTarget,

    #[error("path segment is not valid base64url: {0}")]
    InvalidBase64(String),

    #[error("decoded payload does not embed a URL")]
    NoEmbeddedUrl,

    #[error("embedded destination is not an absolute http(s) URL: {0}")]
    InvalidUrl(String),
}

/// Why the sentiment classifier could not label a title.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("classifier transport error: {0}")]
    Transport(String),

    #[error("classifier answered with HTTP {0}")]
    Status(u16),

    #[error("classifier response could not be decoded: {0}")]
    Decode(String),

    #[error("classifier returned unknown label {0:?}")]
    UnknownLabel(String),
}
