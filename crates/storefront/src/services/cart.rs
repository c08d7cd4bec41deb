//! Session cart backed by the product table.
//!
//! Every load reconciles the stored lines against the database: lines for
//! products that no longer exist ("ghost items") are dropped and the
//! cleaned map is written back to the session.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tower_sessions::Session;
use tracing::{instrument, warn};

use zestify_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::order::summarize_lines;
use crate::models::{CartMap, Product, session_keys};

/// Errors that can occur while loading or saving the cart.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One cart line joined with its product, as rendered by templates.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    /// Unit price captured when the product was first added.
    pub price: Decimal,
    pub total_price: Decimal,
}

/// The current session's cart.
pub struct Cart {
    session: Session,
    lines: CartMap,
    products: HashMap<ProductId, Product>,
}

impl Cart {
    /// Load the cart from the session and drop ghost items.
    ///
    /// A missing or unreadable session value is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store or the product lookup fails.
    #[instrument(skip_all)]
    pub async fn load(session: &Session, products: &ProductRepository<'_>) -> Result<Self, CartError> {
        let lines = read_lines(session).await?;
        let found = products.get_many(&lines.product_ids()).await?;
        Self::reconcile(session, lines, found).await
    }

    /// Join stored lines with the products that still exist. The session is
    /// only written when a ghost line was dropped.
    async fn reconcile(
        session: &Session,
        mut lines: CartMap,
        found: Vec<Product>,
    ) -> Result<Self, CartError> {
        let products: HashMap<ProductId, Product> =
            found.into_iter().map(|p| (p.id, p)).collect();

        let removed = lines.retain_existing(|id| products.contains_key(&id));
        if removed > 0 {
            tracing::debug!(removed, "dropped ghost items from cart");
            session.insert(session_keys::CART, &lines).await?;
        }

        Ok(Self {
            session: session.clone(),
            lines,
            products,
        })
    }

    /// Add `quantity` units of `product`. The line keeps the price recorded
    /// on its first add.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn add(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        self.lines.add(product.id, product.price, quantity);
        self.products
            .entry(product.id)
            .or_insert_with(|| product.clone());
        self.save().await
    }

    /// Remove a product's line if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn remove(&mut self, product_id: ProductId) -> Result<(), CartError> {
        if self.lines.remove(product_id) {
            self.save().await?;
        }
        Ok(())
    }

    /// Empty the cart by removing its session key.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.session.remove_value(session_keys::CART).await?;
        self.lines = CartMap::new();
        Ok(())
    }

    /// Lines whose product still exists, in product ID order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lines
            .lines()
            .filter_map(|(id, line)| {
                self.products.get(&id).map(|product| CartItem {
                    product: product.clone(),
                    quantity: line.quantity,
                    price: line.price,
                    total_price: line.total_price(),
                })
            })
            .collect()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.lines.total_quantity()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The order summary for the current lines, one `"{qty}x {name}"` per line.
    #[must_use]
    pub fn order_summary(&self) -> String {
        summarize_lines(
            self.lines
                .lines()
                .filter_map(|(id, line)| {
                    self.products
                        .get(&id)
                        .map(|product| (line.quantity, product.name.as_str()))
                }),
        )
    }

    /// Sum of line totals for products that still exist.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines
            .total_price_where(|id| self.products.contains_key(&id))
    }

    async fn save(&self) -> Result<(), CartError> {
        self.session.insert(session_keys::CART, &self.lines).await?;
        Ok(())
    }
}

async fn read_lines(session: &Session) -> Result<CartMap, CartError> {
    let Some(raw) = session.get_value(session_keys::CART).await? else {
        return Ok(CartMap::new());
    };

    Ok(serde_json::from_value(raw).unwrap_or_else(|e| {
        warn!(error = %e, "discarding malformed cart in session");
        CartMap::new()
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: i64, name: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            category_id: None,
            name: name.to_owned(),
            description: String::new(),
            price,
            image: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_read_lines_missing_is_empty() {
        let lines = read_lines(&session()).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_read_lines_discards_malformed_value() {
        let session = session();
        session
            .insert_value(session_keys::CART, serde_json::json!(["not", "a", "cart"]))
            .await
            .unwrap();

        let lines = read_lines(&session).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_drops_ghost_lines_and_writes_back() {
        let session = session();
        let mut lines = CartMap::new();
        lines.add(ProductId::new(1), Decimal::new(2_999, 2), 2);
        lines.add(ProductId::new(2), Decimal::new(500, 2), 1);

        let found = vec![product(1, "Pro Football", Decimal::new(2_999, 2))];
        let cart = Cart::reconcile(&session, lines, found).await.unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items().len(), 1);
        assert!(session.is_modified());

        let stored: CartMap = session.get(session_keys::CART).await.unwrap().unwrap();
        assert_eq!(stored.product_ids(), vec![ProductId::new(1)]);
    }

    #[tokio::test]
    async fn test_reconcile_without_ghosts_leaves_session_untouched() {
        let session = session();
        let mut lines = CartMap::new();
        lines.add(ProductId::new(1), Decimal::new(2_999, 2), 1);

        let found = vec![product(1, "Pro Football", Decimal::new(2_999, 2))];
        let cart = Cart::reconcile(&session, lines, found).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert!(!session.is_modified());
    }

    #[tokio::test]
    async fn test_order_summary_and_total_use_frozen_prices() {
        let session = session();
        let mut lines = CartMap::new();
        lines.add(ProductId::new(1), Decimal::new(2_999, 2), 2);
        lines.add(ProductId::new(3), Decimal::new(89_950, 2), 1);
        lines.add(ProductId::new(9), Decimal::new(100, 2), 4);

        // Product 1 has since been repriced; product 9 is gone.
        let found = vec![
            product(1, "Pro Football", Decimal::new(3_499, 2)),
            product(3, "Canon DSLR Camera", Decimal::new(89_950, 2)),
        ];
        let cart = Cart::reconcile(&session, lines, found).await.unwrap();

        assert_eq!(cart.order_summary(), "2x Pro Football\n1x Canon DSLR Camera");
        assert_eq!(cart.total_price(), Decimal::new(95_948, 2));
    }
}
