//! Engine facade: text -> classification -> estimate -> ledger -> summary.
//!
//! One submission may be in flight per engine. A second submission while the
//! first is awaiting the classifier is rejected with `EngineError::Busy`.
//! The classifier call is the only await point before the ledger lock; if the
//! caller drops the future or the timeout fires, nothing is accumulated.
//!
//! Ledger mutations are applied to a copy, persisted, then swapped in while
//! the lock is held, so readers never see a half-applied update.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use greenscore_classify::{classify, Classifier, MIN_CONFIDENCE};
use greenscore_core::ledger::HISTORY_CAPACITY;
use greenscore_core::{
    estimate, percentage, Category, Challenge, ChallengeState, FootprintTotals, HistoryEntry,
    ImpactEstimate, Ledger, Store, CATALOG,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::summary::format_summary;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub min_confidence: f64,
    pub timeout: Duration,
    pub history_capacity: usize,
    /// Record the best guess even when it is under `min_confidence`
    pub proceed_on_low_confidence: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE,
            timeout: Duration::from_secs(30),
            history_capacity: HISTORY_CAPACITY,
            proceed_on_low_confidence: false,
        }
    }
}

/// A submission that made it into the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub category: Category,
    /// Classifier score, `None` when the caller chose the category
    pub confidence: Option<f64>,
    /// `None` when no rule applied; the category is then recorded at zero
    pub estimate: Option<ImpactEstimate>,
    /// This submission's share of the category's daily budget
    pub percentage: f64,
    pub summary: String,
}

/// Normalized view of the running totals for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub totals: FootprintTotals,
    pub percentages: Vec<(Category, f64)>,
    pub overall: f64,
    pub streak_days: u32,
    pub points: u32,
}

struct State<S> {
    ledger: Ledger,
    store: S,
}

pub struct Engine<C, S> {
    classifier: C,
    config: EngineConfig,
    state: Mutex<State<S>>,
    in_flight: AtomicBool,
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<C: Classifier, S: Store> Engine<C, S> {
    /// Load the ledger from `store` and build an engine around it.
    pub fn open(classifier: C, store: S, config: EngineConfig) -> Result<Self> {
        let ledger = Ledger::load(&store, config.history_capacity)?;
        Ok(Self {
            classifier,
            config,
            state: Mutex::new(State { ledger, store }),
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    fn begin(&self) -> Result<FlightGuard<'_>, EngineError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("rejecting overlapping submission");
            return Err(EngineError::Busy);
        }
        Ok(FlightGuard(&self.in_flight))
    }

    /// Classify `text`, estimate its impact and fold it into the ledger.
    pub async fn classify_and_record(&self, text: &str) -> Result<Recorded, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }
        let _guard = self.begin()?;

        let verdict = tokio::time::timeout(
            self.config.timeout,
            classify(&self.classifier, text, self.config.min_confidence),
        )
        .await
        .map_err(|_| {
            warn!(timeout = ?self.config.timeout, "classifier timed out");
            EngineError::Timeout(self.config.timeout)
        })??;

        let (category, score) = verdict.best();
        if !verdict.is_confident() && !self.config.proceed_on_low_confidence {
            return Err(EngineError::LowConfidence {
                best: category,
                score,
            });
        }

        self.apply(text, category, Some(score)).await
    }

    /// Record `text` under a caller-chosen category, skipping the classifier.
    pub async fn record(&self, text: &str, category: Category) -> Result<Recorded, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }
        let _guard = self.begin()?;
        self.apply(text, category, None).await
    }

    /// `classify_and_record`, reduced to the string shown to the user.
    pub async fn submit(&self, text: &str) -> String {
        match self.classify_and_record(text).await {
            Ok(r) => r.summary,
            Err(e) => {
                info!(error = %e, "submission not recorded");
                e.user_message()
            }
        }
    }

    async fn apply(
        &self,
        text: &str,
        category: Category,
        confidence: Option<f64>,
    ) -> Result<Recorded, EngineError> {
        let estimate = estimate(text, category);
        if estimate.is_none() {
            info!(%category, "no rule applied, recording zero impact");
        }
        let raw = estimate.as_ref().map(|e| e.raw_value).unwrap_or(0.0);
        let pct = percentage(category, raw);
        let summary = format_summary(category, estimate.as_ref(), pct);

        self.mutate(|ledger| {
            ledger.merge(category, raw);
            ledger.append_history(text, &summary, Utc::now());
            Ok(())
        })
        .await?;

        Ok(Recorded {
            category,
            confidence,
            estimate,
            percentage: pct,
            summary,
        })
    }

    /// Apply `f` to a copy of the ledger, persist it, then publish it.
    async fn mutate<T>(&self, f: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock().await;
        let mut next = state.ledger.clone();
        let out = f(&mut next)?;
        next.persist(&mut state.store)?;
        state.ledger = next;
        Ok(out)
    }

    pub async fn progress(&self) -> Progress {
        let state = self.state.lock().await;
        let totals = state.ledger.totals;
        Progress {
            totals,
            percentages: Category::ALL
                .iter()
                .map(|c| (*c, totals.percentage(*c)))
                .collect(),
            overall: totals.overall_percentage(),
            streak_days: state.ledger.streak_days,
            points: state.ledger.points(),
        }
    }

    /// Newest first, at most `limit` entries
    pub async fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let state = self.state.lock().await;
        state.ledger.history.iter().take(limit).cloned().collect()
    }

    /// Zero all totals and clear history in one step.
    pub async fn reset(&self) -> Result<()> {
        self.mutate(|ledger| {
            ledger.reset();
            Ok(())
        })
        .await?;
        info!("footprint reset");
        Ok(())
    }

    pub async fn increment_streak(&self) -> Result<u32> {
        self.mutate(|ledger| Ok(ledger.increment_streak())).await
    }

    pub async fn challenges(&self) -> Vec<(Challenge, ChallengeState)> {
        let state = self.state.lock().await;
        CATALOG
            .iter()
            .map(|c| (*c, state.ledger.challenges.state(c.id)))
            .collect()
    }

    pub async fn start_challenge(&self, id: &str) -> Result<()> {
        self.mutate(|ledger| ledger.challenges.start(id)).await
    }

    /// Returns points awarded by this call
    pub async fn complete_challenge(&self, id: &str) -> Result<u32> {
        self.mutate(|ledger| ledger.challenges.complete(id)).await
    }

    /// Consume the engine, handing back its store.
    pub fn into_store(self) -> S {
        self.state.into_inner().store
    }
}
