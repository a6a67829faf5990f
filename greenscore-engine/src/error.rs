use std::time::Duration;

use greenscore_classify::{ClassificationError, ServiceErrorKind};
use greenscore_core::Category;
use thiserror::Error;

/// Every way a submission can end without being recorded
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("a submission is already in flight")]
    Busy,

    #[error("classifier did not answer within {0:?}")]
    Timeout(Duration),

    #[error("classifier {kind}: {message}")]
    Service {
        kind: ServiceErrorKind,
        message: String,
    },

    #[error("low confidence {score:.2} for {best}")]
    LowConfidence { best: Category, score: f64 },

    #[error("storage: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl From<ClassificationError> for EngineError {
    fn from(e: ClassificationError) -> Self {
        match e {
            ClassificationError::Input => EngineError::EmptyInput,
            ClassificationError::Service { kind, message } => {
                EngineError::Service { kind, message }
            }
        }
    }
}

impl EngineError {
    /// Short message suitable for showing to the person who typed the text.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::EmptyInput => "⚠️ Empty input".to_string(),
            EngineError::Busy => "⏳ Still working on your previous action".to_string(),
            EngineError::Timeout(_) => "Classification timed out, please try again".to_string(),
            EngineError::Service { kind, .. } => format!("Classification failed ({kind})"),
            EngineError::LowConfidence { best, score } => format!(
                "⚠️ Action not recognized (best guess: {best}, {:.0}% confidence)",
                score * 100.0
            ),
            EngineError::Store(_) => "Could not save your action".to_string(),
        }
    }
}
