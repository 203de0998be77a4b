//! Toxicity gate
//!
//! Scores a comment and decides whether it is rejected before any further
//! analysis. The gate score is the maximum over the classifier's sub-category
//! scores; a comment is toxic when that score is strictly above
//! [`TOXICITY_THRESHOLD`].
//!
//! **Fail-open:** when the classifier is missing, errors, or returns nothing
//! usable, the verdict is `(false, 0.0)`. Traffic is never blocked by a
//! classifier outage, and nothing is filtered during one either. Every fail-open
//! verdict is logged at `warn` so outages are visible.

use super::{ModelError, ToxicityModel};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Scores above this value are toxic; a score of exactly 0.6 is not
pub const TOXICITY_THRESHOLD: f64 = 0.6;

/// Outcome of a toxicity evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToxicityVerdict {
    pub is_toxic: bool,
    pub score: f64,
}

impl ToxicityVerdict {
    /// Apply the threshold to a gate score
    pub fn from_score(score: f64) -> Self {
        Self {
            is_toxic: score > TOXICITY_THRESHOLD,
            score,
        }
    }

    /// Verdict used when no score could be computed
    pub fn fail_open() -> Self {
        Self {
            is_toxic: false,
            score: 0.0,
        }
    }
}

/// First pipeline stage: rejects toxic comments
pub struct ToxicityGate {
    model: Option<Arc<dyn ToxicityModel>>,
}

impl ToxicityGate {
    /// Gate backed by an external classifier
    pub fn new(model: Arc<dyn ToxicityModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Gate with no classifier; every comment passes with score 0.0
    pub fn disabled() -> Self {
        Self { model: None }
    }

    /// Name of the backing classifier, for `/info`
    pub fn backend_name(&self) -> String {
        match &self.model {
            Some(model) => model.name().to_string(),
            None => "disabled".to_string(),
        }
    }

    /// Score `text` and apply the threshold. Never fails.
    pub async fn evaluate(&self, text: &str) -> ToxicityVerdict {
        let Some(model) = &self.model else {
            debug!("Toxicity classifier not configured, passing comment");
            return ToxicityVerdict::fail_open();
        };

        match model.score(text).await.and_then(gate_score) {
            Ok(score) => {
                let verdict = ToxicityVerdict::from_score(score);
                debug!(
                    "Toxicity check: score={:.3}, toxic={}",
                    verdict.score, verdict.is_toxic
                );
                verdict
            }
            Err(e) => {
                warn!("Toxicity classifier failed, failing open: {}", e);
                ToxicityVerdict::fail_open()
            }
        }
    }
}

/// Reduce sub-category scores to the gate score (their maximum)
fn gate_score(scores: Vec<f64>) -> Result<f64, ModelError> {
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ModelError::UnexpectedResponse(
            "non-finite toxicity score".to_string(),
        ));
    }

    scores
        .into_iter()
        .reduce(f64::max)
        .map(|max| max.clamp(0.0, 1.0))
        .ok_or_else(|| ModelError::UnexpectedResponse("no toxicity scores returned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedScores(Vec<f64>);

    #[async_trait]
    impl ToxicityModel for FixedScores {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn score(&self, _text: &str) -> Result<Vec<f64>, ModelError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl ToxicityModel for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn score(&self, _text: &str) -> Result<Vec<f64>, ModelError> {
            Err(ModelError::Unavailable("model is loading".to_string()))
        }
    }

    fn gate(scores: Vec<f64>) -> ToxicityGate {
        ToxicityGate::new(Arc::new(FixedScores(scores)))
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(!ToxicityVerdict::from_score(0.6).is_toxic);
        assert!(ToxicityVerdict::from_score(0.6000001).is_toxic);
        assert!(!ToxicityVerdict::from_score(0.0).is_toxic);
        assert!(ToxicityVerdict::from_score(1.0).is_toxic);
    }

    #[tokio::test]
    async fn test_gate_uses_maximum_subcategory_score() {
        let verdict = gate(vec![0.1, 0.75, 0.3]).evaluate("text").await;
        assert!(verdict.is_toxic);
        assert_eq!(verdict.score, 0.75);
    }

    #[tokio::test]
    async fn test_gate_passes_low_scores() {
        let verdict = gate(vec![0.05, 0.2]).evaluate("text").await;
        assert!(!verdict.is_toxic);
        assert_eq!(verdict.score, 0.2);
    }

    #[tokio::test]
    async fn test_fails_open_on_model_error() {
        let gate = ToxicityGate::new(Arc::new(Broken));
        assert_eq!(gate.evaluate("anything").await, ToxicityVerdict::fail_open());
    }

    #[tokio::test]
    async fn test_fails_open_on_empty_or_invalid_scores() {
        assert_eq!(gate(vec![]).evaluate("x").await, ToxicityVerdict::fail_open());
        assert_eq!(
            gate(vec![0.9, f64::NAN]).evaluate("x").await,
            ToxicityVerdict::fail_open()
        );
    }

    #[tokio::test]
    async fn test_disabled_gate_passes_everything() {
        let gate = ToxicityGate::disabled();
        assert_eq!(gate.backend_name(), "disabled");
        assert_eq!(gate.evaluate("anything").await, ToxicityVerdict::fail_open());
    }

    #[tokio::test]
    async fn test_evaluation_is_repeatable() {
        let gate = gate(vec![0.42, 0.13]);
        let first = gate.evaluate("same input").await;
        let second = gate.evaluate("same input").await;
        assert_eq!(first, second);
    }
}
