//! Order repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use zestify_core::{OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::Order;

const ORDER_COLUMNS: &str = "id, user_id, product_names, total_price, status, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    product_names: String,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            product_names: row.product_names,
            total_price: row.total_price,
            status,
            created_at: row.created_at,
        })
    }
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order in the `Processing` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, product_names))]
    pub async fn create(
        &self,
        user_id: UserId,
        product_names: &str,
        total_price: Decimal,
    ) -> Result<Order, RepositoryError> {
        let row: OrderRow = sqlx::query_as(&format!(
            r"
            INSERT INTO storefront.orders (user_id, product_names, total_price, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(product_names)
        .bind(total_price)
        .bind(OrderStatus::Processing.as_str())
        .fetch_one(self.pool)
        .await?;

        Order::try_from(row)
    }

    /// A user's orders, newest first, optionally limited.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        limit: Option<i64>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM storefront.orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// An order, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }
}
