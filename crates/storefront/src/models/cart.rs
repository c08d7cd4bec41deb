//! The session cart's stored representation.
//!
//! The cart lives in the session under [`super::session_keys::CART`] as a
//! JSON object keyed by product ID:
//!
//! ```json
//! { "3": { "quantity": 2, "price": "29.99" } }
//! ```
//!
//! The price is captured when a product is first added and is not refreshed
//! on later adds. Everything here is pure; [`crate::services::cart::Cart`]
//! ties it to the session and the product table.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zestify_core::ProductId;

/// One cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Always positive for stored lines.
    pub quantity: u32,
    /// Unit price frozen at add-time. Serialized as a decimal string.
    pub price: Decimal,
}

impl CartLine {
    /// `price * quantity`.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Product ID (as a string) to line mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartMap(BTreeMap<String, CartLine>);

impl CartMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a product. A new line records `price`; an
    /// existing line keeps its original price. Quantities saturate at
    /// `u32::MAX`. Adding zero units never creates a line.
    pub fn add(&mut self, product_id: ProductId, price: Decimal, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let line = self
            .0
            .entry(product_id.to_string())
            .or_insert(CartLine { quantity: 0, price });
        line.quantity = line.quantity.saturating_add(quantity);
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        self.0.remove(&product_id.to_string()).is_some()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLine> {
        self.0.get(&product_id.to_string())
    }

    /// IDs of every line whose key is a valid product ID.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.0.keys().filter_map(|key| key.parse().ok()).collect()
    }

    /// Drop every line whose key is not a product ID accepted by `exists`,
    /// including keys that are not integers at all. Also drops lines with a
    /// zero quantity. Returns the number of lines removed.
    pub fn retain_existing(&mut self, mut exists: impl FnMut(ProductId) -> bool) -> usize {
        let before = self.0.len();
        self.0.retain(|key, line| {
            line.quantity > 0 && key.parse::<ProductId>().is_ok_and(&mut exists)
        });
        before - self.0.len()
    }

    /// Lines in product ID order.
    pub fn lines(&self) -> impl Iterator<Item = (ProductId, &CartLine)> {
        let mut lines: Vec<_> = self
            .0
            .iter()
            .filter_map(|(key, line)| key.parse::<ProductId>().ok().map(|id| (id, line)))
            .collect();
        lines.sort_by_key(|(id, _)| *id);
        lines.into_iter()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.0.values().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of line totals for lines accepted by `include`.
    #[must_use]
    pub fn total_price_where(&self, mut include: impl FnMut(ProductId) -> bool) -> Decimal {
        self.lines()
            .filter(|(id, _)| include(*id))
            .map(|(_, line)| line.total_price())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_quantity() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(n: i64) -> ProductId {
        ProductId::new(n)
    }

    #[test]
    fn test_add_creates_line_then_accumulates() {
        let mut cart = CartMap::new();
        cart.add(id(3), Decimal::new(2999, 2), 1);
        cart.add(id(3), Decimal::new(2999, 2), 2);

        let line = cart.get(id(3)).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.total_price(), Decimal::new(8997, 2));
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_price_is_frozen_at_first_add() {
        let mut cart = CartMap::new();
        cart.add(id(1), Decimal::new(129_999, 2), 1);
        cart.add(id(1), Decimal::new(99_999, 2), 1);

        assert_eq!(cart.get(id(1)).unwrap().price, Decimal::new(129_999, 2));
    }

    #[test]
    fn test_quantity_saturates() {
        let mut cart = CartMap::new();
        cart.add(id(1), Decimal::ONE, u32::MAX);
        cart.add(id(1), Decimal::ONE, 5);
        assert_eq!(cart.get(id(1)).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_adding_zero_is_a_no_op() {
        let mut cart = CartMap::new();
        cart.add(id(1), Decimal::ONE, 0);
        assert!(cart.is_empty());
        assert!(cart.get(id(1)).is_none());
    }

    #[test]
    fn test_remove() {
        let mut cart = CartMap::new();
        cart.add(id(1), Decimal::ONE, 1);
        assert!(cart.remove(id(1)));
        assert!(!cart.remove(id(1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_retain_existing_drops_ghosts_and_junk_keys() {
        let mut cart: CartMap = serde_json::from_str(
            r#"{
                "1": {"quantity": 1, "price": "10.00"},
                "2": {"quantity": 2, "price": "5.50"},
                "abc": {"quantity": 1, "price": "1.00"},
                "4": {"quantity": 0, "price": "1.00"}
            }"#,
        )
        .unwrap();

        let removed = cart.retain_existing(|pid| pid == id(1));
        assert_eq!(removed, 3);
        assert_eq!(cart.product_ids(), vec![id(1)]);
        assert_eq!(cart.total_quantity(), 1);
    }

    #[test]
    fn test_total_price_only_counts_included_lines() {
        let mut cart = CartMap::new();
        cart.add(id(1), Decimal::new(1000, 2), 2);
        cart.add(id(2), Decimal::new(550, 2), 1);

        assert_eq!(cart.total_price_where(|_| true), Decimal::new(2550, 2));
        assert_eq!(cart.total_price_where(|pid| pid == id(2)), Decimal::new(550, 2));
        assert_eq!(CartMap::new().total_price_where(|_| true), Decimal::ZERO);
    }

    #[test]
    fn test_lines_are_ordered_numerically() {
        let mut cart = CartMap::new();
        cart.add(id(10), Decimal::ONE, 1);
        cart.add(id(2), Decimal::ONE, 1);
        let ids: Vec<_> = cart.lines().map(|(pid, _)| pid).collect();
        assert_eq!(ids, vec![id(2), id(10)]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut cart = CartMap::new();
        cart.add(id(3), Decimal::new(2999, 2), 2);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"3": {"quantity": 2, "price": "29.99"}})
        );
    }
}
