//! Saved card and UPI repository.
//!
//! Cards and UPI IDs keep separate default flags: a user can have one
//! default card and one default UPI ID at the same time.

use sqlx::PgPool;
use tracing::instrument;

use zestify_core::{SavedCardId, SavedUpiId, UserId};

use super::{RepositoryError, default_flag};
use crate::models::{NewCard, NewUpi, SavedCard, SavedUpi};

const CARD_TABLE: &str = "saved_card";
const UPI_TABLE: &str = "saved_upi";

const CARD_COLUMNS: &str = "id, user_id, card_number_last_four, card_holder_name, card_type, \
     expiry_month, expiry_year, is_default";
const UPI_COLUMNS: &str = "id, user_id, upi_id, is_default";

#[derive(sqlx::FromRow)]
struct SavedCardRow {
    id: SavedCardId,
    user_id: UserId,
    card_number_last_four: String,
    card_holder_name: String,
    card_type: String,
    expiry_month: String,
    expiry_year: String,
    is_default: bool,
}

impl From<SavedCardRow> for SavedCard {
    fn from(row: SavedCardRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            card_number_last_four: row.card_number_last_four,
            card_holder_name: row.card_holder_name,
            card_type: row.card_type,
            expiry_month: row.expiry_month,
            expiry_year: row.expiry_year,
            is_default: row.is_default,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SavedUpiRow {
    id: SavedUpiId,
    user_id: UserId,
    upi_id: String,
    is_default: bool,
}

impl From<SavedUpiRow> for SavedUpi {
    fn from(row: SavedUpiRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            upi_id: row.upi_id,
            is_default: row.is_default,
        }
    }
}

/// Repository for saved payment methods.
pub struct PaymentMethodRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentMethodRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Cards
    // =========================================================================

    /// The user's cards, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_cards(&self, user_id: UserId) -> Result<Vec<SavedCard>, RepositoryError> {
        let rows: Vec<SavedCardRow> = sqlx::query_as(&format!(
            r"
            SELECT {CARD_COLUMNS} FROM storefront.saved_card
            WHERE user_id = $1
            ORDER BY is_default DESC, id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedCard::from).collect())
    }

    /// A card, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_card(
        &self,
        id: SavedCardId,
        user_id: UserId,
    ) -> Result<Option<SavedCard>, RepositoryError> {
        let row: Option<SavedCardRow> = sqlx::query_as(&format!(
            "SELECT {CARD_COLUMNS} FROM storefront.saved_card WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(SavedCard::from))
    }

    /// Save a card. The user's first card becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, card), fields(last_four = %card.last_four))]
    pub async fn create_card(
        &self,
        user_id: UserId,
        card: &NewCard,
    ) -> Result<SavedCard, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let is_default = !default_flag::user_has_rows(&mut tx, CARD_TABLE, user_id).await?;

        let row: SavedCardRow = sqlx::query_as(&format!(
            r"
            INSERT INTO storefront.saved_card (
                user_id, card_number_last_four, card_holder_name, card_type,
                expiry_month, expiry_year, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CARD_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&card.last_four)
        .bind(&card.card_holder_name)
        .bind(card.card_type.as_str())
        .bind(&card.expiry_month)
        .bind(&card.expiry_year)
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SavedCard::from(row))
    }

    /// Delete a card, promoting the newest remaining card when the default
    /// is removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the card does not exist or
    /// belongs to someone else.
    #[instrument(skip(self))]
    pub async fn delete_card(&self, id: SavedCardId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if !default_flag::delete_owned(&mut tx, CARD_TABLE, id.as_i64(), user_id).await? {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Make a card the user's only default card.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the card does not exist or
    /// belongs to someone else.
    #[instrument(skip(self))]
    pub async fn set_default_card(
        &self,
        id: SavedCardId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if !default_flag::set_default(&mut tx, CARD_TABLE, id.as_i64(), user_id).await? {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // UPI
    // =========================================================================

    /// The user's UPI IDs, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_upis(&self, user_id: UserId) -> Result<Vec<SavedUpi>, RepositoryError> {
        let rows: Vec<SavedUpiRow> = sqlx::query_as(&format!(
            r"
            SELECT {UPI_COLUMNS} FROM storefront.saved_upi
            WHERE user_id = $1
            ORDER BY is_default DESC, id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedUpi::from).collect())
    }

    /// A UPI ID, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_upi(
        &self,
        id: SavedUpiId,
        user_id: UserId,
    ) -> Result<Option<SavedUpi>, RepositoryError> {
        let row: Option<SavedUpiRow> = sqlx::query_as(&format!(
            "SELECT {UPI_COLUMNS} FROM storefront.saved_upi WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(SavedUpi::from))
    }

    /// Save a UPI ID. The user's first UPI ID becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, upi))]
    pub async fn create_upi(&self, user_id: UserId, upi: &NewUpi) -> Result<SavedUpi, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let is_default = !default_flag::user_has_rows(&mut tx, UPI_TABLE, user_id).await?;

        let row: SavedUpiRow = sqlx::query_as(&format!(
            r"
            INSERT INTO storefront.saved_upi (user_id, upi_id, is_default)
            VALUES ($1, $2, $3)
            RETURNING {UPI_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(upi.upi_id.as_str())
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SavedUpi::from(row))
    }

    /// Delete a UPI ID, promoting the newest remaining one when the default
    /// is removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the UPI ID does not exist or
    /// belongs to someone else.
    #[instrument(skip(self))]
    pub async fn delete_upi(&self, id: SavedUpiId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if !default_flag::delete_owned(&mut tx, UPI_TABLE, id.as_i64(), user_id).await? {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Make a UPI ID the user's only default UPI ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the UPI ID does not exist or
    /// belongs to someone else.
    #[instrument(skip(self))]
    pub async fn set_default_upi(
        &self,
        id: SavedUpiId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if !default_flag::set_default(&mut tx, UPI_TABLE, id.as_i64(), user_id).await? {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }
}
