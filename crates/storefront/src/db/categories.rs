//! Category repository.

use sqlx::PgPool;
use tracing::instrument;

use zestify_core::{CategoryId, Slug};

use super::RepositoryError;
use crate::models::Category;

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug for category {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            slug,
        })
    }
}

/// Repository for categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r"SELECT id, name, slug FROM storefront.category ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// Look up a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r"SELECT id, name, slug FROM storefront.category WHERE slug = $1",
        )
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }

    /// Fetch a category by slug, creating it when missing. The slug is
    /// derived from the name when not supplied.
    ///
    /// Returns the category and whether it was created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if no valid slug can be
    /// derived from `name`.
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_or_create(
        &self,
        name: &str,
        slug: Option<&Slug>,
    ) -> Result<(Category, bool), RepositoryError> {
        let slug = match slug {
            Some(slug) => slug.clone(),
            None => Slug::from_name(name).map_err(|e| {
                RepositoryError::InvalidInput(format!("category name {name:?}: {e}"))
            })?,
        };

        let inserted: Option<CategoryRow> = sqlx::query_as(
            r"
            INSERT INTO storefront.category (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO NOTHING
            RETURNING id, name, slug
            ",
        )
        .bind(name)
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok((Category::try_from(row)?, true));
        }

        let existing = self
            .get_by_slug(&slug)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok((existing, false))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    #[tokio::test]
    async fn test_get_or_create_rejects_name_without_slug() {
        // Never connects: the name is rejected before any query runs.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/zestify_test")
            .unwrap();

        let err = CategoryRepository::new(&pool)
            .get_or_create("&&&", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidInput(_)));
    }
}
