//! Challenge catalog and the points they award.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fixed challenge definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub impact: &'static str,
    pub duration: &'static str,
}

pub const CATALOG: &[Challenge] = &[
    Challenge {
        id: "energy-saving",
        title: "Energy saving challenge",
        description: "Reduce the time you leave your light bulbs on when you are not using them",
        points: 200,
        impact: "Reduce energy consumption by 15%",
        duration: "7 days",
    },
    Challenge {
        id: "water-conservation",
        title: "Water conservation",
        description: "Reduce water usage by taking shorter showers this week",
        points: 150,
        impact: "Save up to 500 gallons of water",
        duration: "5 days",
    },
];

pub fn find(id: &str) -> Option<&'static Challenge> {
    CATALOG.iter().find(|c| c.id == id)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeState {
    pub active: bool,
    pub completed: bool,
}

/// Per-challenge progress plus the running points total
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChallengeBoard {
    pub states: BTreeMap<String, ChallengeState>,
    pub points: u32,
}

impl ChallengeBoard {
    pub fn state(&self, id: &str) -> ChallengeState {
        self.states.get(id).copied().unwrap_or_default()
    }

    pub fn start(&mut self, id: &str) -> Result<()> {
        if find(id).is_none() {
            bail!("unknown challenge: {id}");
        }
        let st = self.states.entry(id.to_string()).or_default();
        if !st.completed {
            st.active = true;
        }
        Ok(())
    }

    /// Mark completed and award points. Returns the points awarded (0 if
    /// the challenge was already completed).
    pub fn complete(&mut self, id: &str) -> Result<u32> {
        let Some(challenge) = find(id) else {
            bail!("unknown challenge: {id}");
        };
        let st = self.states.entry(id.to_string()).or_default();
        if st.completed {
            return Ok(0);
        }
        st.active = false;
        st.completed = true;
        self.points = self.points.saturating_add(challenge.points);
        Ok(challenge.points)
    }
}
