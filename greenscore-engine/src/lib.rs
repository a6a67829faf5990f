//! greenscore-engine: orchestrates classification, estimation and accumulation

pub mod engine;
pub mod error;
pub mod summary;

pub use engine::{Engine, EngineConfig, Progress, Recorded};
pub use error::EngineError;
pub use summary::format_summary;
