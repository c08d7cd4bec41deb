//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use zestify_core::{CategoryId, ProductId};

use super::{RepositoryError, escape_like};
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "id, category_id, name, description, price, image, created_at";

/// Product columns as selected by [`PRODUCT_COLUMNS`].
#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    id: ProductId,
    category_id: Option<CategoryId>,
    name: String,
    description: String,
    price: Decimal,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            price: row.price,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

/// A product to insert.
#[derive(Debug, Clone)]
pub struct NewProduct<'p> {
    pub name: &'p str,
    pub description: &'p str,
    pub price: Decimal,
    pub category_id: Option<CategoryId>,
    pub image: Option<String>,
}

/// Repository for products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products in a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM storefront.product
            WHERE category_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Case-insensitive substring search over name and description.
    /// `LIKE` wildcards in the query match literally.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(query));
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM storefront.product
            WHERE name ILIKE $1 ESCAPE '\' OR description ILIKE $1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Fetch every product whose ID is in `ids`. Missing IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i64> = ids.iter().map(ProductId::as_i64).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = ANY($1)"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Whether a product with this exact name exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            r"SELECT EXISTS(SELECT 1 FROM storefront.product WHERE name = $1)",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct<'_>) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r"
            INSERT INTO storefront.product (name, description, price, category_id, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.category_id)
        .bind(product.image.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(Product::from(row))
    }

    /// Move a product into a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn set_category(
        &self,
        id: ProductId,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"UPDATE storefront.product SET category_id = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(category_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
