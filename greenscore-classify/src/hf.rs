//! Hugging Face inference API zero-shot classifier.
//!
//! Request:  POST {endpoint}  {"inputs": text, "parameters": {"candidate_labels": [...]}}
//! Response: {"labels": [...], "scores": [...]}  (sometimes wrapped in a one-element array)

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::gateway::{ClassificationError, ClassificationResult, Classifier, ServiceErrorKind};

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

#[derive(Debug, Clone)]
pub struct HfClassifier {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

#[derive(Serialize)]
struct Parameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: Parameters<'a>,
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

impl HfClassifier {
    /// An empty token is accepted; the remote call will then fail.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers(&self) -> Result<HeaderMap, ClassificationError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
            ClassificationError::service(
                ServiceErrorKind::Transport,
                "credential is not a valid header value",
            )
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn request(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<ClassificationResult, ClassificationError> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: Parameters {
                candidate_labels: labels,
            },
        };

        debug!(endpoint = %self.endpoint, labels = labels.len(), "zero-shot request");

        let resp = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ClassificationError::service(ServiceErrorKind::Transport, e.to_string())
            })?;

        let status = resp.status();
        let txt = resp.text().await.map_err(|e| {
            ClassificationError::service(ServiceErrorKind::Transport, e.to_string())
        })?;

        if !status.is_success() {
            return Err(ClassificationError::service(
                ServiceErrorKind::Transport,
                format!("{status} {}", txt.trim()),
            ));
        }

        parse_response(&txt)
    }
}

impl Classifier for HfClassifier {
    async fn rank(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<ClassificationResult, ClassificationError> {
        self.request(text, labels).await
    }
}

/// Parse a zero-shot response body into a ranked result.
pub fn parse_response(body: &str) -> Result<ClassificationResult, ClassificationError> {
    if body.trim().is_empty() {
        return Err(ClassificationError::service(
            ServiceErrorKind::NoData,
            "empty response body",
        ));
    }

    let mut v: Value = serde_json::from_str(body).map_err(|e| {
        ClassificationError::service(ServiceErrorKind::BadShape, format!("parse json: {e}"))
    })?;

    if let Value::Array(items) = v {
        v = items.into_iter().next().ok_or_else(|| {
            ClassificationError::service(ServiceErrorKind::NoData, "empty response array")
        })?;
    }

    if let Some(err) = v.get("error").and_then(|e| e.as_str()) {
        return Err(ClassificationError::service(
            ServiceErrorKind::BadShape,
            format!("service reported: {err}"),
        ));
    }

    let out: ZeroShotResponse = serde_json::from_value(v).map_err(|e| {
        ClassificationError::service(ServiceErrorKind::BadShape, format!("labels/scores: {e}"))
    })?;

    ClassificationResult::from_labels_scores(&out.labels, &out.scores)
}
