// src/lib.rs
// Public library surface for the demo runner and integration tests.

pub mod classifier;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::config::Settings;
pub use crate::error::{ClassifyError, FetchError, LinkDecodeError};
pub use crate::ingest::types::{NewsItem, RawItem, SourceProvider, SIMULATED_SOURCE};
pub use crate::pipeline::{Origin, PipelineRun, RunSummary, Session};
pub use crate::sentiment::{ScoredItem, Sentiment, SentimentScorer};
