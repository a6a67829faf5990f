//! Caller-facing summary strings

use greenscore_core::{Category, ImpactEstimate};

/// `Category: <Label>\nAdding: <magnitude>\nImpact: <pct>%`
///
/// The `Adding:` line is left out when no estimate could be made.
pub fn format_summary(category: Category, estimate: Option<&ImpactEstimate>, pct: f64) -> String {
    let mut s = format!("Category: {}", category.display_name());
    if let Some(e) = estimate {
        s.push_str(&format!("\nAdding: {}", e.magnitude));
    }
    s.push_str(&format!("\nImpact: {pct:.1}%"));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_with_estimate() {
        let e = ImpactEstimate::new(Category::Transport, 1.2);
        assert_eq!(
            format_summary(Category::Transport, Some(&e), 17.142857),
            "Category: Transport\nAdding: 1.20 kg CO₂\nImpact: 17.1%"
        );
    }

    #[test]
    fn test_summary_without_estimate() {
        assert_eq!(
            format_summary(Category::Waste, None, 0.0),
            "Category: Waste\nImpact: 0.0%"
        );
    }
}
