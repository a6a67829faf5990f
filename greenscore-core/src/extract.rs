//! Quantity extraction from free text.
//!
//! Scans lowercased text for the first number immediately followed by one of
//! a caller-supplied set of unit synonyms:
//!
//!   "drove 5 km, then 3 miles"  + [km, miles]  -> (5.0, "km")
//!   "charged for 2hrs"          + [hrs, hours] -> (2.0, "hrs")
//!
//! First match wins. Thousands separators ("1,000 km") are accepted; numbers
//! too large to represent as a finite f64 are treated as no match. Unit
//! conversion belongs to the caller.

use regex::Regex;

pub const KILOMETERS: &[&str] = &["km", "kms", "kilometer", "kilometers", "kilometre", "kilometres"];
pub const MILES: &[&str] = &["mi", "mile", "miles"];
pub const HOURS: &[&str] = &["h", "hr", "hrs", "hour", "hours"];
pub const MINUTES: &[&str] = &["min", "mins", "minute", "minutes"];
pub const BULBS: &[&str] = &["bulb", "bulbs", "light", "lights", "lamp", "lamps"];

pub const MILES_TO_KM: f64 = 1.60934;

/// A number and the unit synonym that followed it
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

impl Quantity {
    /// True when the matched unit is one of `synonyms`
    pub fn unit_in(&self, synonyms: &[&str]) -> bool {
        synonyms.iter().any(|s| *s == self.unit)
    }
}

/// Return the first `<number><sep><unit>` pair in left-to-right order.
pub fn extract_quantity(text: &str, unit_synonyms: &[&str]) -> Option<Quantity> {
    if unit_synonyms.is_empty() {
        return None;
    }

    // Longest synonyms first: the regex alternation is leftmost-first.
    let mut units: Vec<&str> = unit_synonyms.to_vec();
    units.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = units
        .iter()
        .map(|u| regex::escape(&u.to_lowercase()))
        .collect::<Vec<_>>()
        .join("|");

    let re = Regex::new(&format!(
        r"(?P<value>\d{{1,3}}(?:,\d{{3}})+(?:\.\d+)?|\d+(?:\.\d+)?)[\s-]{{0,2}}(?P<unit>{alternation})\b"
    ))
    .ok()?;

    let lowered = text.to_lowercase();
    let caps = re.captures(&lowered)?;
    let value: f64 = caps["value"].replace(',', "").parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(Quantity {
        value,
        unit: caps["unit"].to_string(),
    })
}

/// Distance in kilometers, converting miles.
pub fn extract_distance_km(text: &str) -> Option<f64> {
    let units: Vec<&str> = KILOMETERS.iter().chain(MILES).copied().collect();
    let q = extract_quantity(text, &units)?;
    if q.unit_in(MILES) {
        Some(q.value * MILES_TO_KM)
    } else {
        Some(q.value)
    }
}

/// Duration in hours, converting minutes.
pub fn extract_duration_hours(text: &str) -> Option<f64> {
    let units: Vec<&str> = HOURS.iter().chain(MINUTES).copied().collect();
    let q = extract_quantity(text, &units)?;
    if q.unit_in(MINUTES) {
        Some(q.value / 60.0)
    } else {
        Some(q.value)
    }
}
