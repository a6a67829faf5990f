//! Running footprint totals, the bounded history log, and day/point counters.
//!
//! `Ledger` is a plain owned value. Callers that share it across tasks wrap it
//! in their own lock; `load`/`persist` move it across the `Store` boundary.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::category::Category;
use crate::challenges::{ChallengeBoard, ChallengeState, CATALOG};
use crate::normalize::percentage;
use crate::store::Store;

pub const HISTORY_CAPACITY: usize = 100;

pub const HISTORY_KEY: &str = "history";
pub const STREAK_KEY: &str = "streak.days";
pub const POINTS_KEY: &str = "points.total";

pub fn footprint_key(category: Category) -> String {
    format!("footprint.{}", category.label())
}

pub fn challenge_key(id: &str) -> String {
    format!("challenge.{id}")
}

/// Per-category running raw totals plus their weighted combination
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FootprintTotals {
    pub water: f64,
    pub energy: f64,
    pub transport: f64,
    pub waste: f64,
    /// Weighted sum of the four categories
    pub total: f64,
}

impl FootprintTotals {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Water => self.water,
            Category::Energy => self.energy,
            Category::Transport => self.transport,
            Category::Waste => self.waste,
        }
    }

    fn slot(&mut self, category: Category) -> &mut f64 {
        match category {
            Category::Water => &mut self.water,
            Category::Energy => &mut self.energy,
            Category::Transport => &mut self.transport,
            Category::Waste => &mut self.waste,
        }
    }

    /// Add `raw_value` to the category and recompute `total`.
    ///
    /// An update that would leave any total non-finite is dropped; the store
    /// cannot represent NaN or infinity.
    pub fn merge(&mut self, category: Category, raw_value: f64) {
        let mut next = *self;
        *next.slot(category) += raw_value;
        next.recompute_total();
        if !next.total.is_finite() {
            warn!(%category, raw_value, "dropping non-finite footprint update");
            return;
        }
        *self = next;
    }

    pub fn recompute_total(&mut self) {
        self.total = Category::ALL
            .iter()
            .map(|c| self.get(*c) * c.weight())
            .sum();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Category progress against its daily budget, [0, 100]
    pub fn percentage(&self, category: Category) -> f64 {
        percentage(category, self.get(category))
    }

    /// Weighted mean of the category percentages, [0, 100]
    pub fn overall_percentage(&self) -> f64 {
        let weight_sum: f64 = Category::ALL.iter().map(|c| c.weight()).sum();
        Category::ALL
            .iter()
            .map(|c| self.percentage(*c) * c.weight())
            .sum::<f64>()
            / weight_sum
    }
}

/// One audit-log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub summary: String,
}

/// Newest-first log that never grows past its capacity
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn append(&mut self, input: &str, summary: &str, timestamp: DateTime<Utc>) {
        self.entries.push_front(HistoryEntry {
            timestamp,
            input: input.to_string(),
            summary: summary.to_string(),
        });
        if self.entries.len() > self.capacity {
            let evicted = self.entries.len() - self.capacity;
            self.entries.truncate(self.capacity);
            debug!(evicted, "history over capacity");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything the engine accumulates between sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub totals: FootprintTotals,
    pub history: HistoryLedger,
    pub streak_days: u32,
    pub challenges: ChallengeBoard,
}

impl Ledger {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: HistoryLedger::with_capacity(history_capacity),
            ..Self::default()
        }
    }

    pub fn merge(&mut self, category: Category, raw_value: f64) {
        self.totals.merge(category, raw_value);
        debug!(%category, raw_value, total = self.totals.total, "merged estimate");
    }

    pub fn append_history(&mut self, input: &str, summary: &str, timestamp: DateTime<Utc>) {
        self.history.append(input, summary, timestamp);
    }

    /// Zero every category total and clear history. Counters are untouched.
    pub fn reset(&mut self) {
        self.totals.reset();
        self.history.clear();
    }

    pub fn increment_streak(&mut self) -> u32 {
        self.streak_days = self.streak_days.saturating_add(1);
        self.streak_days
    }

    pub fn points(&self) -> u32 {
        self.challenges.points
    }

    pub fn load(store: &impl Store, history_capacity: usize) -> Result<Self> {
        let mut ledger = Ledger::new(history_capacity);

        for c in Category::ALL {
            let v = store.get_scalar(&footprint_key(c))?.unwrap_or(0.0);
            *ledger.totals.slot(c) = v;
        }
        ledger.totals.recompute_total();

        // Stored newest first; rebuild oldest first so capacity trims the tail.
        let raw = store.get_list(HISTORY_KEY)?;
        let mut entries: Vec<HistoryEntry> = Vec::with_capacity(raw.len());
        for line in raw {
            match serde_json::from_str::<HistoryEntry>(&line) {
                Ok(e) => entries.push(e),
                Err(e) => warn!(error = %e, "skipping unreadable history entry"),
            }
        }
        for e in entries.into_iter().rev() {
            ledger.history.append(&e.input, &e.summary, e.timestamp);
        }

        ledger.streak_days = store.get_scalar(STREAK_KEY)?.unwrap_or(0.0).max(0.0) as u32;
        ledger.challenges.points = store.get_scalar(POINTS_KEY)?.unwrap_or(0.0).max(0.0) as u32;

        for c in CATALOG {
            if let Some(v) = store.get_record(&challenge_key(c.id))? {
                let st: ChallengeState = serde_json::from_value(v)
                    .with_context(|| format!("parse challenge record {}", c.id))?;
                ledger.challenges.states.insert(c.id.to_string(), st);
            }
        }

        Ok(ledger)
    }

    pub fn persist(&self, store: &mut impl Store) -> Result<()> {
        for c in Category::ALL {
            store.set_scalar(&footprint_key(c), self.totals.get(c))?;
        }

        let lines = self
            .history
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .context("serialize history")?;
        store.set_list(HISTORY_KEY, lines)?;

        store.set_scalar(STREAK_KEY, f64::from(self.streak_days))?;
        store.set_scalar(POINTS_KEY, f64::from(self.challenges.points))?;

        for (id, st) in &self.challenges.states {
            store.upsert_record(&challenge_key(id), serde_json::to_value(st)?)?;
        }

        store.flush()
    }
}
