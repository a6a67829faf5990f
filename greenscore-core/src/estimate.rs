//! Deterministic impact estimation from activity text.
//!
//! Each category owns a lookup table of trigger phrases. Evaluation walks the
//! table and sums every matching rule; nothing here is learned, so the same
//! text and category always yield the same estimate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::Category;
use crate::extract::{extract_distance_km, extract_duration_hours, extract_quantity, BULBS};

/// A single heuristic impact judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub category: Category,
    /// Human-readable magnitude, e.g. "1.20 kg CO₂"
    pub magnitude: String,
    /// Raw value in the category's unit
    pub raw_value: f64,
}

impl ImpactEstimate {
    pub fn new(category: Category, raw_value: f64) -> Self {
        Self {
            category,
            magnitude: category.format_magnitude(raw_value),
            raw_value,
        }
    }
}

/// Whether a rule adds to the footprint or credits against it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Cost,
    Credit,
}

/// How a rule's base amount scales with quantities found in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Flat,
    /// Multiplied by an extracted duration in hours (default 1h)
    PerHour,
    /// Multiplied by an extracted bulb/light count (default 1)
    PerBulb,
}

/// One row of a category rule table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    /// Fires when any of these phrases is mentioned
    pub when: &'static [&'static str],
    /// ...and, if non-empty, any of these is also mentioned
    pub also: &'static [&'static str],
    /// ...and none of these is mentioned
    pub unless: &'static [&'static str],
    pub amount: f64,
    pub polarity: Polarity,
    pub scale: Scale,
}

impl Rule {
    const fn cost(name: &'static str, when: &'static [&'static str], amount: f64) -> Self {
        Self {
            name,
            when,
            also: &[],
            unless: &[],
            amount,
            polarity: Polarity::Cost,
            scale: Scale::Flat,
        }
    }

    const fn credit(name: &'static str, when: &'static [&'static str], amount: f64) -> Self {
        Self {
            polarity: Polarity::Credit,
            ..Self::cost(name, when, amount)
        }
    }

    const fn also(self, also: &'static [&'static str]) -> Self {
        Self { also, ..self }
    }

    const fn unless(self, unless: &'static [&'static str]) -> Self {
        Self { unless, ..self }
    }

    const fn scaled(self, scale: Scale) -> Self {
        Self { scale, ..self }
    }

    pub fn matches(&self, words: &Words) -> bool {
        words.mentions_any(self.when)
            && (self.also.is_empty() || words.mentions_any(self.also))
            && !words.mentions_any(self.unless)
    }

    /// Signed contribution for `text`, assuming the rule matched.
    pub fn contribution(&self, text: &str) -> f64 {
        let factor = match self.scale {
            Scale::Flat => 1.0,
            Scale::PerHour => extract_duration_hours(text).unwrap_or(1.0),
            Scale::PerBulb => extract_quantity(text, BULBS).map(|q| q.value).unwrap_or(1.0),
        };
        let value = self.amount * factor;
        match self.polarity {
            Polarity::Cost => value,
            Polarity::Credit => -value,
        }
    }
}

/// Lowercased word tokens of an activity description
#[derive(Debug, Clone)]
pub struct Words(Vec<String>);

impl Words {
    pub fn new(text: &str) -> Self {
        Self(
            text.to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .map(|t| t.to_string())
                .collect(),
        )
    }

    /// True when `phrase` appears as a contiguous run of whole words.
    pub fn mentions(&self, phrase: &str) -> bool {
        let needle: Vec<&str> = phrase.split_whitespace().collect();
        if needle.is_empty() || needle.len() > self.0.len() {
            return false;
        }
        self.0
            .windows(needle.len())
            .any(|w| w.iter().zip(&needle).all(|(a, b)| a == b))
    }

    pub fn mentions_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.mentions(p))
    }
}

// ---------------------------------------------------------------------------
// Water (liters)

const SHOWER: &[&str] = &["shower", "showers", "showered", "showering"];
const TEETH: &[&str] = &["teeth", "toothbrush", "toothbrushing"];
const TAP_OFF: &[&str] = &["turned off", "turn off", "turning off", "tap off", "cup", "glass"];

pub const WATER_RULES: &[Rule] = &[
    Rule::cost("shower", SHOWER, 35.0),
    Rule::cost("long or hot shower", SHOWER, 15.0).also(&["long", "hot"]),
    Rule::cost("bath", &["bath", "bathtub", "bathed"], 80.0),
    Rule::cost("toothbrushing, tap running", TEETH, 8.0).unless(TAP_OFF),
    Rule::cost("toothbrushing, tap off", TEETH, 1.0).also(TAP_OFF),
    Rule::cost("toilet flush", &["toilet", "flush", "flushed", "flushing"], 6.0),
    Rule::cost("dishwasher", &["dishwasher"], 15.0),
    Rule::cost("hand-washed dishes", &["dishes", "dish"], 30.0).unless(&["dishwasher"]),
    Rule::cost("laundry", &["laundry", "washing machine", "washer"], 50.0),
];

pub const WATER_DEFAULT_LITERS: f64 = 5.0;

// ---------------------------------------------------------------------------
// Energy (kWh)

const CHARGE: &[&str] = &["charge", "charged", "charging"];

pub const ENERGY_RULES: &[Rule] = &[
    Rule::cost("air conditioning", &["ac", "air conditioning", "air conditioner", "aircon"], 1.5)
        .scaled(Scale::PerHour),
    Rule::cost("heater", &["heater", "heating"], 2.0),
    Rule::cost("laundry", &["laundry", "washing machine"], 1.0),
    Rule::cost("dryer", &["dryer", "tumble dryer"], 3.0),
    Rule::cost("phone charge", &["phone", "smartphone"], 0.01).also(CHARGE),
    Rule::cost("laptop charge", &["laptop"], 0.06).also(CHARGE),
    Rule::cost("device charge", CHARGE, 0.03).unless(&["phone", "smartphone", "laptop"]),
    Rule::cost(
        "lighting",
        &["light", "lights", "bulb", "bulbs", "lamp", "lamps", "lighting"],
        0.05,
    )
    .scaled(Scale::PerBulb),
    Rule::cost("tv", &["tv", "television"], 0.1),
    Rule::cost("computer", &["computer", "pc", "desktop"], 0.15),
];

pub const ENERGY_DEFAULT_KWH: f64 = 0.5;

// ---------------------------------------------------------------------------
// Waste (kg)

pub const WASTE_RULES: &[Rule] = &[
    Rule::credit("recycling", &["recycle", "recycled", "recycling"], 0.2),
    Rule::credit("composting", &["compost", "composted", "composting"], 0.3),
    Rule::credit("reuse", &["reuse", "reused", "reusing", "reusable"], 0.1),
    Rule::cost("plastic", &["plastic", "plastics"], 0.05),
    Rule::cost("bottle", &["bottle", "bottles"], 0.03),
    Rule::cost("disposable", &["disposable", "single use"], 0.05),
    Rule::cost(
        "food waste",
        &["food waste", "wasted food", "threw away food", "leftovers"],
        0.3,
    ),
    Rule::cost("paper", &["paper", "cardboard"], 0.02),
];

const WASTE_GENERIC: &[&str] = &["trash", "garbage", "rubbish", "litter", "waste", "bin"];

pub const WASTE_GENERIC_KG: f64 = 0.2;

// ---------------------------------------------------------------------------
// Transport (kg CO₂)

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Plane,
    Train,
    Bus,
    Car,
    Active,
}

/// (mode, cue words, kg CO₂ per km), checked in order
pub const MODES: &[(Mode, &[&str], f64)] = &[
    (Mode::Plane, &["plane", "airplane", "flight", "flew", "fly", "flying"], 0.15),
    (Mode::Train, &["train", "subway", "metro", "tram", "rail"], 0.02),
    (Mode::Bus, &["bus", "buses", "coach"], 0.03),
    (Mode::Car, &["car", "drove", "drive", "driving", "taxi", "uber", "cab"], 0.12),
    (
        Mode::Active,
        &[
            "bike", "biked", "bicycle", "cycled", "cycling", "walk", "walked", "walking", "run",
            "ran", "running", "jog", "jogged",
        ],
        0.0,
    ),
];

const TRIP_CUES: &[&str] = &[
    "trip", "commute", "commuted", "ride", "rode", "travel", "traveled", "travelled", "journey",
];

pub const CAR_KG_PER_KM: f64 = 0.12;
pub const TYPICAL_TRIP_KM: f64 = 10.0;

pub fn detect_mode(words: &Words) -> Option<(Mode, f64)> {
    MODES
        .iter()
        .find(|(_, cues, _)| words.mentions_any(cues))
        .map(|(mode, _, factor)| (*mode, *factor))
}

fn estimate_transport(text: &str, words: &Words) -> Option<f64> {
    let mode = detect_mode(words);
    let factor = mode.map(|(_, f)| f).unwrap_or(CAR_KG_PER_KM);

    if let Some(km) = extract_distance_km(text) {
        debug!(?mode, km, factor, "transport distance found");
        return Some(km * factor);
    }

    if mode.is_some() || words.mentions_any(TRIP_CUES) {
        debug!(?mode, "no distance, assuming typical trip");
        return Some(TYPICAL_TRIP_KM * factor);
    }

    None
}

/// Sum of every matching rule's contribution, or `None` when nothing matched.
pub fn evaluate_rules(rules: &[Rule], text: &str, words: &Words) -> Option<f64> {
    let mut total = 0.0;
    let mut matched = false;
    for rule in rules {
        if rule.matches(words) {
            let c = rule.contribution(text);
            debug!(rule = rule.name, contribution = c, "rule matched");
            total += c;
            matched = true;
        }
    }
    matched.then_some(total)
}

/// Estimate the impact of `text` under `category`.
pub fn estimate(text: &str, category: Category) -> Option<ImpactEstimate> {
    let words = Words::new(text);

    let raw = match category {
        Category::Transport => estimate_transport(text, &words),
        Category::Water => {
            Some(evaluate_rules(WATER_RULES, text, &words).unwrap_or(WATER_DEFAULT_LITERS))
        }
        Category::Energy => {
            Some(evaluate_rules(ENERGY_RULES, text, &words).unwrap_or(ENERGY_DEFAULT_KWH))
        }
        Category::Waste => evaluate_rules(WASTE_RULES, text, &words)
            .or_else(|| words.mentions_any(WASTE_GENERIC).then_some(WASTE_GENERIC_KG)),
    }?;

    if !raw.is_finite() {
        debug!(%category, raw, "non-finite estimate discarded");
        return None;
    }
    Some(ImpactEstimate::new(category, raw))
}
