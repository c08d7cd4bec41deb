//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use zestify_core::{OrderId, OrderStatus, UserId};

/// A placed order.
///
/// Line items are denormalized into `product_names`, one `"{qty}x {name}"`
/// line per product, so the order survives later catalog changes.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_names: String,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The summary split back into its lines.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<&str> {
        self.product_names
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Build the order summary from `(quantity, name)` pairs.
#[must_use]
pub fn summarize_lines<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = (u32, &'a str)>,
{
    lines
        .into_iter()
        .map(|(quantity, name)| format!("{quantity}x {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_round_trip() {
        let summary = summarize_lines([(2, "Pro Football"), (1, "Canon DSLR Camera")]);
        assert_eq!(summary, "2x Pro Football\n1x Canon DSLR Camera");

        let order = Order {
            id: OrderId::new(1),
            user_id: UserId::new(1),
            product_names: summary,
            total_price: Decimal::new(95_948, 2),
            status: OrderStatus::Processing,
            created_at: Utc::now(),
        };
        assert_eq!(
            order.summary_lines(),
            vec!["2x Pro Football", "1x Canon DSLR Camera"]
        );
    }
}
