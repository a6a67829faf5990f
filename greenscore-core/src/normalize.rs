//! Display-only normalization of raw quantities against daily budgets

use crate::category::Category;

/// Percentage of the category's daily reference budget, clamped to [0, 100].
pub fn percentage(category: Category, raw_value: f64) -> f64 {
    if raw_value.is_nan() {
        return 0.0;
    }
    (raw_value / category.daily_budget() * 100.0).clamp(0.0, 100.0)
}
