//! HTTP inference client
//!
//! Talks to a Hugging Face-style inference server:
//! `POST {base_url}/models/{model}` with `{"inputs": ..., "parameters": {...}}`.
//!
//! # Accepted response shapes
//! - Classification: `[{"label", "score"}]`, `[[{"label", "score"}]]`, or a flat
//!   `{"label": score}` map (Detoxify style)
//! - Summarization: `[{"summary_text"}]` or `{"summary_text"}`
//! - Errors: `{"error": "..."}` (e.g. model still loading)

use super::{GenerationParams, LabelScore, ModelError, SentimentModel, SummaryModel, ToxicityModel};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// One model hosted on an inference server
///
/// Implements every model trait; which one is used depends on the stage it is
/// plugged into. The underlying `reqwest::Client` is cheap to clone and shares
/// its connection pool.
#[derive(Clone)]
pub struct HttpModel {
    http_client: Client,
    endpoint: String,
    model: String,
}

impl HttpModel {
    pub fn new(http_client: Client, base_url: &str, model: impl Into<String>) -> Self {
        let model = model.into();
        let endpoint = format!("{}/models/{}", base_url.trim_end_matches('/'), model);
        Self {
            http_client,
            endpoint,
            model,
        }
    }

    /// Build the shared HTTP client with a per-request timeout
    pub fn client(timeout: Duration) -> Result<Client, ModelError> {
        Ok(Client::builder().timeout(timeout).build()?)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, body: Value) -> Result<Value, ModelError> {
        debug!("Inference request to {}", self.endpoint);

        let response = self.http_client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ModelError::Unavailable(format!(
                "{} returned {}: {}",
                self.model, status, text
            )));
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            ModelError::UnexpectedResponse(format!("{} returned invalid JSON: {}", self.model, e))
        })?;

        if let Some(error) = value.get("error") {
            return Err(ModelError::Unavailable(format!("{}: {}", self.model, error)));
        }

        Ok(value)
    }
}

#[async_trait]
impl ToxicityModel for HttpModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn score(&self, text: &str) -> Result<Vec<f64>, ModelError> {
        // top_k = null asks for every category rather than only the best one
        let response = self
            .post(json!({ "inputs": text, "parameters": { "top_k": null } }))
            .await?;
        Ok(parse_label_scores(&response)?
            .into_iter()
            .map(|p| p.score)
            .collect())
    }
}

#[async_trait]
impl SentimentModel for HttpModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn predict(&self, text: &str) -> Result<Vec<LabelScore>, ModelError> {
        let response = self
            .post(json!({ "inputs": text, "parameters": { "truncation": true } }))
            .await?;
        parse_label_scores(&response)
    }
}

#[async_trait]
impl SummaryModel for HttpModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, text: &str, params: &GenerationParams) -> Result<String, ModelError> {
        let response = self.post(json!({ "inputs": text, "parameters": params })).await?;
        parse_summary(&response)
    }
}

/// Flatten any accepted classification shape into label/score pairs
pub fn parse_label_scores(value: &Value) -> Result<Vec<LabelScore>, ModelError> {
    let mut scores = Vec::new();
    collect_label_scores(value, &mut scores)?;

    if scores.is_empty() {
        return Err(ModelError::UnexpectedResponse(format!(
            "no label scores in {}",
            value
        )));
    }

    Ok(scores)
}

fn collect_label_scores(value: &Value, out: &mut Vec<LabelScore>) -> Result<(), ModelError> {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_label_scores(item, out)?;
            }
            Ok(())
        }
        Value::Object(map) if map.contains_key("label") => {
            let label = map.get("label").and_then(Value::as_str);
            let score = map.get("score").and_then(Value::as_f64);
            match (label, score) {
                (Some(label), Some(score)) => {
                    out.push(LabelScore {
                        label: label.to_string(),
                        score,
                    });
                    Ok(())
                }
                _ => Err(ModelError::UnexpectedResponse(format!(
                    "malformed prediction {}",
                    value
                ))),
            }
        }
        Value::Object(map) => {
            for (label, score) in map {
                let score = score.as_f64().ok_or_else(|| {
                    ModelError::UnexpectedResponse(format!("non-numeric score for '{}'", label))
                })?;
                out.push(LabelScore {
                    label: label.clone(),
                    score,
                });
            }
            Ok(())
        }
        other => Err(ModelError::UnexpectedResponse(format!(
            "unexpected classification value {}",
            other
        ))),
    }
}

/// Extract generated summary text
pub fn parse_summary(value: &Value) -> Result<String, ModelError> {
    let entry = match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    entry
        .and_then(|e| e.get("summary_text").or_else(|| e.get("generated_text")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ModelError::UnexpectedResponse(format!("no summary_text in {}", value)))
}
