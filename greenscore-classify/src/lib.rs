//! greenscore-classify: zero-shot classification gateway and its HTTP client

pub mod gateway;
pub mod hf;

pub use gateway::{
    classify, gate, ClassificationError, ClassificationResult, Classifier, ServiceErrorKind,
    Verdict, MIN_CONFIDENCE,
};
pub use hf::{parse_response, HfClassifier, DEFAULT_ENDPOINT};
