//! Wishlist repository.

use sqlx::PgPool;
use tracing::instrument;

use zestify_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::Product;

/// Result of toggling a wishlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistToggle {
    Added,
    Removed,
}

/// Repository for wishlists.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add the product if it is not saved yet, otherwise remove it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistToggle, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r"
            INSERT INTO storefront.wishlist (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        let toggle = if inserted.rows_affected() > 0 {
            WishlistToggle::Added
        } else {
            sqlx::query(
                r"DELETE FROM storefront.wishlist WHERE user_id = $1 AND product_id = $2",
            )
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
            WishlistToggle::Removed
        };

        tx.commit().await?;
        Ok(toggle)
    }

    /// The user's saved products, most recently saved first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products_for_user(&self, user_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT p.id, p.category_id, p.name, p.description, p.price, p.image, p.created_at
            FROM storefront.wishlist w
            JOIN storefront.product p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.added_at DESC, w.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
