use metrics::counter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::classifier::{build_classifier_from_config, DynClassifier};
use crate::config::scorer::ScorerConfig;
use crate::ingest::types::NewsItem;

/// Keyword fallback: checked in this order, positive category before negative.
pub const POSITIVE_KEYWORDS: &[&str] = &["rise", "boost", "record", "strong", "surge", "high"];
pub const NEGATIVE_KEYWORDS: &[&str] = &["fall", "drop", "drought", "threat", "tariff", "low"];

/// Fallback score magnitude range (inclusive).
pub const FALLBACK_MIN: f64 = 0.6;
pub const FALLBACK_MAX: f64 = 0.95;

const DISPLAY_TITLE_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Error,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A news item with its sentiment. The score's sign always matches the label:
/// Negative ⇒ ≤ 0, Positive ⇒ ≥ 0, Neutral/Error ⇒ 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    item: NewsItem,
    sentiment: Sentiment,
    score: f64,
}

impl ScoredItem {
    /// Only constructor; folds `score` into [-1, 1] with the sign implied by `sentiment`.
    pub fn new(item: NewsItem, sentiment: Sentiment, score: f64) -> Self {
        let magnitude = if score.is_finite() {
            score.abs().min(1.0)
        } else {
            0.0
        };
        let score = match sentiment {
            Sentiment::Positive => magnitude,
            Sentiment::Negative => -magnitude,
            Sentiment::Neutral | Sentiment::Error => 0.0,
        };
        Self {
            item,
            sentiment,
            score,
        }
    }

    pub fn item(&self) -> &NewsItem {
        &self.item
    }
    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Title shortened to 100 chars with a "..." suffix.
    pub fn display_title(&self) -> String {
        let t = &self.item.title;
        if t.chars().count() > DISPLAY_TITLE_CHARS {
            let mut s: String = t.chars().take(DISPLAY_TITLE_CHARS).collect();
            s.push_str("...");
            s
        } else {
            t.clone()
        }
    }

    /// False for placeholder links ("#") and anything that is not http(s).
    pub fn has_usable_link(&self) -> bool {
        self.item.link != "#" && self.item.link.contains("http")
    }
}

/// Positive if any positive keyword occurs, else Negative if any negative one does.
pub fn keyword_polarity(title: &str) -> Option<Sentiment> {
    let t = title.to_lowercase();
    if POSITIVE_KEYWORDS.iter().any(|w| t.contains(w)) {
        Some(Sentiment::Positive)
    } else if NEGATIVE_KEYWORDS.iter().any(|w| t.contains(w)) {
        Some(Sentiment::Negative)
    } else {
        None
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// How a score was produced; used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMethod {
    Model,
    Keyword,
}

impl ScoreMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Keyword => "keyword",
        }
    }
}

/// Model-backed scorer with a keyword fallback when no model is available.
pub struct SentimentScorer {
    classifier: Option<DynClassifier>,
    rng: StdRng,
}

impl SentimentScorer {
    /// `seed` makes the keyword fallback reproducible.
    pub fn new(classifier: Option<DynClassifier>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { classifier, rng }
    }

    /// Keyword fallback only.
    pub fn keyword_only(seed: Option<u64>) -> Self {
        Self::new(None, seed)
    }

    pub fn from_config(cfg: &ScorerConfig) -> Self {
        Self::new(build_classifier_from_config(cfg), cfg.seed)
    }

    pub fn method(&self) -> ScoreMethod {
        if self.classifier.is_some() {
            ScoreMethod::Model
        } else {
            ScoreMethod::Keyword
        }
    }

    /// (label, score) for one title. A failing model call yields `Error` with score 0;
    /// it never propagates.
    pub async fn score(&mut self, title: &str) -> (Sentiment, f64) {
        let method = self.method();
        let out = match &self.classifier {
            Some(model) => match model.classify(title).await {
                Ok(c) => {
                    let score = match c.label {
                        Sentiment::Positive => c.confidence,
                        Sentiment::Negative => -c.confidence,
                        Sentiment::Neutral | Sentiment::Error => 0.0,
                    };
                    (c.label, round3(score))
                }
                Err(e) => {
                    tracing::warn!(
                        target: "scorer",
                        model = model.model_name(),
                        error = %e,
                        "classification failed"
                    );
                    counter!("sentiment_errors_total").increment(1);
                    (Sentiment::Error, 0.0)
                }
            },
            None => self.keyword_score(title),
        };
        counter!("sentiment_scored_total", "method" => method.as_str()).increment(1);
        out
    }

    pub async fn score_item(&mut self, item: NewsItem) -> ScoredItem {
        let (sentiment, score) = self.score(&item.title).await;
        ScoredItem::new(item, sentiment, score)
    }

    /// Scores items one by one, preserving order.
    pub async fn score_all(&mut self, items: Vec<NewsItem>) -> Vec<ScoredItem> {
        let mut out = Vec::with_capacity(items.len());
        for it in items {
            out.push(self.score_item(it).await);
        }
        out
    }

    fn keyword_score(&mut self, title: &str) -> (Sentiment, f64) {
        match keyword_polarity(title) {
            Some(Sentiment::Positive) => (
                Sentiment::Positive,
                round3(self.rng.random_range(FALLBACK_MIN..=FALLBACK_MAX)),
            ),
            Some(Sentiment::Negative) => (
                Sentiment::Negative,
                round3(-self.rng.random_range(FALLBACK_MIN..=FALLBACK_MAX)),
            ),
            _ => (Sentiment::Neutral, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.into(),
            link: "https://example.com".into(),
            source: "Bing News".into(),
            commodity: "wheat".into(),
            timestamp: "2024-05-01 10:00:00".into(),
            published: None,
        }
    }

    #[test]
    fn positive_category_wins_over_negative() {
        assert_eq!(
            keyword_polarity("Corn prices fall due to strong harvest"),
            Some(Sentiment::Positive)
        );
        assert_eq!(
            keyword_polarity("EU imposes new TARIFFS on wheat"),
            Some(Sentiment::Negative)
        );
        assert_eq!(keyword_polarity("Coffee traders await USDA report"), None);
    }

    #[test]
    fn constructor_enforces_sign() {
        let neg = ScoredItem::new(item("a"), Sentiment::Negative, 0.8);
        assert_eq!(neg.score(), -0.8);
        let pos = ScoredItem::new(item("a"), Sentiment::Positive, -0.7);
        assert_eq!(pos.score(), 0.7);
        let neu = ScoredItem::new(item("a"), Sentiment::Neutral, 0.4);
        assert_eq!(neu.score(), 0.0);
        let err = ScoredItem::new(item("a"), Sentiment::Error, f64::NAN);
        assert_eq!(err.score(), 0.0);
        let big = ScoredItem::new(item("a"), Sentiment::Positive, 3.0);
        assert_eq!(big.score(), 1.0);
    }

    #[tokio::test]
    async fn seeded_fallback_is_reproducible_and_in_range() {
        let title = "Wheat prices surge on drought fears in major growing regions";
        let mut a = SentimentScorer::keyword_only(Some(7));
        let mut b = SentimentScorer::keyword_only(Some(7));
        for _ in 0..20 {
            let (sa, xa) = a.score(title).await;
            let (sb, xb) = b.score(title).await;
            assert_eq!(sa, Sentiment::Positive);
            assert_eq!((sa, xa), (sb, xb));
            assert!((FALLBACK_MIN..=FALLBACK_MAX).contains(&xa));
        }
    }

    #[tokio::test]
    async fn negative_fallback_range() {
        let mut s = SentimentScorer::keyword_only(None);
        let (label, score) = s.score("Soybean exports drop sharply this month").await;
        assert_eq!(label, Sentiment::Negative);
        assert!((-FALLBACK_MAX..=-FALLBACK_MIN).contains(&score));
    }

    #[test]
    fn display_helpers() {
        let long = ScoredItem::new(item(&"x".repeat(150)), Sentiment::Neutral, 0.0);
        assert_eq!(long.display_title().chars().count(), 103);
        assert!(long.display_title().ends_with("..."));
        assert!(long.has_usable_link());

        let mut placeholder = item("Coffee harvest outlook improves in Brazil");
        placeholder.link = "#".into();
        let p = ScoredItem::new(placeholder, Sentiment::Neutral, 0.0);
        assert!(!p.has_usable_link());
    }
}
