//! Sentiment classification
//!
//! Two interchangeable strategies implement [`SentimentStrategy`]:
//! - [`ModelSentiment`]: external sequence-classification model; confidence is
//!   the model's probability for the winning class. There is no neutral
//!   detection unless the model itself has a neutral class.
//! - [`KeywordSentiment`]: weighted keyword counts from [`LEXICON`]. Its
//!   confidence is a fixed placeholder, useful for ordering only.
//!
//! [`SentimentClassifier`] runs the configured strategy and falls back to the
//! keyword strategy whenever it fails, so classification itself never fails.

use super::keywords::{KeywordHits, LEXICON};
use super::{word_count, LabelScore, ModelError, SentimentModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Placeholder confidence for a keyword positive/negative decision
pub const KEYWORD_DECISIVE_CONFIDENCE: f64 = 0.7;

/// Placeholder confidence for a keyword neutral decision
pub const KEYWORD_NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Ties on texts this short are neutral
const SHORT_TEXT_WORDS: usize = 3;

/// Coarse polarity of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Map a model-defined class label (`POSITIVE`, `LABEL_0`-style names are
    /// not recognised) onto a sentiment label
    pub fn from_model_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("pos") {
            Some(Self::Positive)
        } else if label.contains("neg") {
            Some(Self::Negative)
        } else if label.contains("neu") {
            Some(Self::Neutral)
        } else {
            None
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label plus confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub confidence: f64,
}

/// A way of classifying sentiment
#[async_trait]
pub trait SentimentStrategy: Send + Sync {
    fn name(&self) -> String;

    async fn classify(&self, text: &str) -> Result<SentimentResult, ModelError>;
}

/// Sentiment from an external classifier
pub struct ModelSentiment {
    model: Arc<dyn SentimentModel>,
}

impl ModelSentiment {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl SentimentStrategy for ModelSentiment {
    fn name(&self) -> String {
        self.model.name().to_string()
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult, ModelError> {
        let predictions = self.model.predict(text).await?;
        pick_prediction(&predictions)
    }
}

/// Choose the highest-probability class and map its label
fn pick_prediction(predictions: &[LabelScore]) -> Result<SentimentResult, ModelError> {
    let best = predictions
        .iter()
        .filter(|p| p.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| ModelError::UnexpectedResponse("no sentiment predictions".to_string()))?;

    let label = SentimentLabel::from_model_label(&best.label).ok_or_else(|| {
        ModelError::UnexpectedResponse(format!("unknown sentiment label '{}'", best.label))
    })?;

    Ok(SentimentResult {
        label,
        confidence: best.score.clamp(0.0, 1.0),
    })
}

/// Sentiment from weighted keyword counts
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSentiment;

impl KeywordSentiment {
    /// Classify without any external dependency
    pub fn classify_text(&self, text: &str) -> SentimentResult {
        let hits = LEXICON.hits(text);
        let label = decide(hits, word_count(text));
        debug!(
            "Keyword sentiment: positive={}, negative={} -> {}",
            hits.positive, hits.negative, label
        );

        let confidence = match label {
            SentimentLabel::Neutral => KEYWORD_NEUTRAL_CONFIDENCE,
            _ => KEYWORD_DECISIVE_CONFIDENCE,
        };

        SentimentResult { label, confidence }
    }
}

/// Majority wins; ties are neutral for very short texts, otherwise lean
/// negative, then positive, then neutral
fn decide(hits: KeywordHits, words: usize) -> SentimentLabel {
    if hits.positive > hits.negative {
        SentimentLabel::Positive
    } else if hits.negative > hits.positive {
        SentimentLabel::Negative
    } else if words <= SHORT_TEXT_WORDS {
        SentimentLabel::Neutral
    } else if hits.negative > 0 {
        SentimentLabel::Negative
    } else if hits.positive > 0 {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Neutral
    }
}

#[async_trait]
impl SentimentStrategy for KeywordSentiment {
    fn name(&self) -> String {
        "keyword".to_string()
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult, ModelError> {
        Ok(self.classify_text(text))
    }
}

/// Second pipeline stage
pub struct SentimentClassifier {
    strategy: Arc<dyn SentimentStrategy>,
    fallback: KeywordSentiment,
}

impl SentimentClassifier {
    pub fn new(strategy: Arc<dyn SentimentStrategy>) -> Self {
        Self {
            strategy,
            fallback: KeywordSentiment,
        }
    }

    /// Model-backed classifier with keyword fallback
    pub fn model_backed(model: Arc<dyn SentimentModel>) -> Self {
        Self::new(Arc::new(ModelSentiment::new(model)))
    }

    /// Keyword-only classifier
    pub fn keyword() -> Self {
        Self::new(Arc::new(KeywordSentiment))
    }

    pub fn backend_name(&self) -> String {
        self.strategy.name()
    }

    /// Classify `text`. Never fails.
    pub async fn classify(&self, text: &str) -> SentimentResult {
        match self.strategy.classify(text).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    "Sentiment strategy '{}' failed, using keyword fallback: {}",
                    self.strategy.name(),
                    e
                );
                self.fallback.classify_text(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Result<Vec<LabelScore>, String>);

    #[async_trait]
    impl SentimentModel for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn predict(&self, _text: &str) -> Result<Vec<LabelScore>, ModelError> {
            self.0.clone().map_err(ModelError::Unavailable)
        }
    }

    fn predictions(pairs: &[(&str, f64)]) -> Vec<LabelScore> {
        pairs
            .iter()
            .map(|(label, score)| LabelScore {
                label: label.to_string(),
                score: *score,
            })
            .collect()
    }

    fn keyword_label(text: &str) -> SentimentLabel {
        KeywordSentiment.classify_text(text).label
    }

    #[test]
    fn test_keyword_positive_comment() {
        let result = KeywordSentiment.classify_text("Great job on this amendment!");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.confidence, KEYWORD_DECISIVE_CONFIDENCE);
    }

    #[test]
    fn test_keyword_negative_comment() {
        assert_eq!(
            keyword_label("This rule is confusing and adds a burden on families"),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn test_keyword_no_hits_is_neutral() {
        let result = KeywordSentiment.classify_text("The hearing is scheduled for Tuesday");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.confidence, KEYWORD_NEUTRAL_CONFIDENCE);
    }

    #[test]
    fn test_tie_rules() {
        let tie = KeywordHits { positive: 1, negative: 1 };
        assert_eq!(decide(tie, 3), SentimentLabel::Neutral);
        assert_eq!(decide(tie, 4), SentimentLabel::Negative);
        assert_eq!(decide(KeywordHits::default(), 10), SentimentLabel::Neutral);
        assert_eq!(decide(KeywordHits { positive: 2, negative: 1 }, 2), SentimentLabel::Positive);
        assert_eq!(decide(KeywordHits { positive: 0, negative: 1 }, 1), SentimentLabel::Negative);
    }

    #[test]
    fn test_keyword_short_tie_is_neutral() {
        // "good" (+1) and "bad" (+1) in three words
        assert_eq!(keyword_label("good and bad"), SentimentLabel::Neutral);
        // same tie in a longer comment leans negative
        assert_eq!(
            keyword_label("some good parts and some bad parts"),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn test_model_label_mapping() {
        assert_eq!(SentimentLabel::from_model_label("POSITIVE"), Some(SentimentLabel::Positive));
        assert_eq!(SentimentLabel::from_model_label("negative"), Some(SentimentLabel::Negative));
        assert_eq!(SentimentLabel::from_model_label("Neutral"), Some(SentimentLabel::Neutral));
        assert_eq!(SentimentLabel::from_model_label("LABEL_1"), None);
    }

    #[tokio::test]
    async fn test_model_backed_uses_argmax() {
        let classifier = SentimentClassifier::model_backed(Arc::new(Scripted(Ok(predictions(&[
            ("NEGATIVE", 0.08),
            ("POSITIVE", 0.92),
        ])))));

        let result = classifier.classify("whatever the model says").await;
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.confidence, 0.92);
        assert_eq!(classifier.backend_name(), "scripted");
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_keywords() {
        let classifier = SentimentClassifier::model_backed(Arc::new(Scripted(Err(
            "connection refused".to_string(),
        ))));

        let result = classifier.classify("Great job on this amendment!").await;
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.confidence, KEYWORD_DECISIVE_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_unknown_model_label_falls_back_to_keywords() {
        let classifier = SentimentClassifier::model_backed(Arc::new(Scripted(Ok(predictions(&[
            ("LABEL_0", 0.99),
        ])))));

        let result = classifier.classify("This is a terrible idea").await;
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn test_keyword_classifier_reports_backend() {
        let classifier = SentimentClassifier::keyword();
        assert_eq!(classifier.backend_name(), "keyword");
        let result = classifier.classify("I fully support this").await;
        assert_eq!(result.label, SentimentLabel::Positive);
    }
}
