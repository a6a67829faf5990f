//! Classification gateway: ranking, confidence gate and error taxonomy.
//!
//! The remote classifier is an opaque oracle behind the `Classifier` trait.
//! `classify` is the only entry point the engine uses: it rejects empty input
//! before any request is made and turns a weak top score into a soft
//! `Verdict::LowConfidence` rather than an error.

use std::fmt;
use std::future::Future;

use greenscore_core::Category;
use tracing::{debug, info};

pub const MIN_CONFIDENCE: f64 = 0.5;

/// Why a classifier call produced nothing usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Empty body or empty label/score arrays
    NoData,
    /// JSON that does not have the expected shape
    BadShape,
    /// Connection, TLS, timeout or non-success HTTP status
    Transport,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceErrorKind::NoData => "no data",
            ServiceErrorKind::BadShape => "bad response shape",
            ServiceErrorKind::Transport => "transport error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassificationError {
    #[error("input text is empty")]
    Input,
    #[error("classifier {kind}: {message}")]
    Service {
        kind: ServiceErrorKind,
        message: String,
    },
}

impl ClassificationError {
    pub fn service(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        ClassificationError::Service {
            kind,
            message: message.into(),
        }
    }

    pub fn service_kind(&self) -> Option<ServiceErrorKind> {
        match self {
            ClassificationError::Service { kind, .. } => Some(*kind),
            ClassificationError::Input => None,
        }
    }
}

/// Categories ranked by descending confidence. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    ranked: Vec<(Category, f64)>,
}

impl ClassificationResult {
    /// Pair labels with scores, drop labels outside the category set and
    /// sort by score. Fails when nothing usable remains.
    pub fn from_labels_scores(
        labels: &[String],
        scores: &[f64],
    ) -> Result<Self, ClassificationError> {
        if labels.is_empty() || scores.is_empty() {
            return Err(ClassificationError::service(
                ServiceErrorKind::NoData,
                "empty labels or scores",
            ));
        }
        if labels.len() != scores.len() {
            return Err(ClassificationError::service(
                ServiceErrorKind::BadShape,
                format!("{} labels but {} scores", labels.len(), scores.len()),
            ));
        }

        let mut ranked = Vec::with_capacity(labels.len());
        for (label, score) in labels.iter().zip(scores) {
            if !(0.0..=1.0).contains(score) {
                return Err(ClassificationError::service(
                    ServiceErrorKind::BadShape,
                    format!("score out of range for {label}: {score}"),
                ));
            }
            match label.parse::<Category>() {
                Ok(c) => ranked.push((c, *score)),
                Err(_) => debug!(%label, "ignoring label outside category set"),
            }
        }

        if ranked.is_empty() {
            return Err(ClassificationError::service(
                ServiceErrorKind::BadShape,
                "no known category labels in response",
            ));
        }

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(Self { ranked })
    }

    /// Top-ranked guess
    pub fn top(&self) -> (Category, f64) {
        self.ranked[0]
    }

    pub fn ranked(&self) -> &[(Category, f64)] {
        &self.ranked
    }
}

/// Outcome of a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Confident(ClassificationResult),
    /// Top score under the threshold; the best label is still carried
    LowConfidence(ClassificationResult),
}

impl Verdict {
    pub fn result(&self) -> &ClassificationResult {
        match self {
            Verdict::Confident(r) | Verdict::LowConfidence(r) => r,
        }
    }

    pub fn best(&self) -> (Category, f64) {
        self.result().top()
    }

    pub fn is_confident(&self) -> bool {
        matches!(self, Verdict::Confident(_))
    }
}

/// Apply the confidence threshold to a ranked result.
pub fn gate(result: ClassificationResult, min_confidence: f64) -> Verdict {
    let (category, score) = result.top();
    if score < min_confidence {
        info!(%category, score, min_confidence, "low confidence classification");
        Verdict::LowConfidence(result)
    } else {
        info!(%category, score, "classified");
        Verdict::Confident(result)
    }
}

/// A zero-shot text classifier: text + candidate labels in, ranking out.
pub trait Classifier {
    fn rank(
        &self,
        text: &str,
        labels: &[&str],
    ) -> impl Future<Output = Result<ClassificationResult, ClassificationError>> + Send;
}

/// Classify `text` against the fixed category set.
pub async fn classify<C: Classifier>(
    classifier: &C,
    text: &str,
    min_confidence: f64,
) -> Result<Verdict, ClassificationError> {
    if text.trim().is_empty() {
        return Err(ClassificationError::Input);
    }
    let labels = Category::candidate_labels();
    let result = classifier.rank(text, &labels).await?;
    Ok(gate(result, min_confidence))
}
