//! Activity categories and their fixed per-category constants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of trackable activity categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "water")]
    Water,
    #[serde(rename = "energy")]
    Energy,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "waste")]
    Waste,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 4] = [
        Category::Water,
        Category::Energy,
        Category::Transport,
        Category::Waste,
    ];

    /// Label sent to the classifier and used as a storage key suffix
    pub fn label(&self) -> &'static str {
        match self {
            Category::Water => "water",
            Category::Energy => "energy",
            Category::Transport => "transport",
            Category::Waste => "waste",
        }
    }

    /// Capitalized label for summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Water => "Water",
            Category::Energy => "Energy",
            Category::Transport => "Transport",
            Category::Waste => "Waste",
        }
    }

    /// Physical unit of raw values in this category
    pub fn unit(&self) -> &'static str {
        match self {
            Category::Water => "L",
            Category::Energy => "kWh",
            Category::Transport => "kg CO₂",
            Category::Waste => "kg",
        }
    }

    /// Weight applied when folding this category into the combined total
    pub fn weight(&self) -> f64 {
        match self {
            Category::Water => 1.0,
            Category::Energy => 1.2,
            Category::Transport => 1.5,
            Category::Waste => 1.3,
        }
    }

    /// Daily reference budget, in this category's unit
    pub fn daily_budget(&self) -> f64 {
        match self {
            Category::Water => 150.0,
            Category::Energy => 10.0,
            Category::Transport => 7.0,
            Category::Waste => 1.5,
        }
    }

    /// Human-readable magnitude, e.g. `1.20 kg CO₂`
    pub fn format_magnitude(&self, value: f64) -> String {
        match self {
            Category::Water => format!("{:.1} {}", value, self.unit()),
            _ => format!("{:.2} {}", value, self.unit()),
        }
    }

    /// Candidate label set for the zero-shot classifier
    pub fn candidate_labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "water" => Ok(Category::Water),
            "energy" => Ok(Category::Energy),
            "transport" => Ok(Category::Transport),
            "waste" => Ok(Category::Waste),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Transport".parse::<Category>(), Ok(Category::Transport));
        assert_eq!(" WATER ".parse::<Category>(), Ok(Category::Water));
        assert!("food".parse::<Category>().is_err());
    }

    #[test]
    fn test_candidate_labels_cover_all_categories() {
        assert_eq!(
            Category::candidate_labels(),
            vec!["water", "energy", "transport", "waste"]
        );
    }

    #[test]
    fn test_magnitude_formats() {
        assert_eq!(Category::Transport.format_magnitude(1.2), "1.20 kg CO₂");
        assert_eq!(Category::Water.format_magnitude(50.0), "50.0 L");
        assert_eq!(Category::Energy.format_magnitude(0.5), "0.50 kWh");
    }
}
