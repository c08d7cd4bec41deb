//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Badge classes for an order status.
///
/// Usage in templates: `{{ order.status|status_badge_class }}`
#[askama::filter_fn]
pub fn status_badge_class(
    status: impl Display,
    _env: &dyn askama::Values,
) -> askama::Result<&'static str> {
    Ok(badge_class_for(&status.to_string()))
}

fn badge_class_for(status: &str) -> &'static str {
    match status.to_lowercase().as_str() {
        "delivered" => "bg-success text-white",
        "shipped" | "packed" => "bg-info text-dark",
        "cancelled" => "bg-danger text-white",
        _ => "bg-warning text-dark",
    }
}

#[cfg(test)]
mod tests {
    use zestify_core::OrderStatus;

    use super::*;

    #[test]
    fn test_badge_class_for_every_status() {
        let classes: Vec<_> = OrderStatus::ALL
            .iter()
            .map(|s| badge_class_for(s.as_str()))
            .collect();
        assert_eq!(
            classes,
            vec![
                "bg-warning text-dark",
                "bg-info text-dark",
                "bg-info text-dark",
                "bg-success text-white",
                "bg-danger text-white",
            ]
        );
    }

    #[test]
    fn test_badge_class_is_case_insensitive() {
        assert_eq!(badge_class_for("DELIVERED"), "bg-success text-white");
        assert_eq!(badge_class_for("unknown"), "bg-warning text-dark");
    }
}
