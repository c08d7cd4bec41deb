//! Address repository.

use sqlx::PgPool;
use tracing::instrument;

use zestify_core::{AddressId, AddressType, UserId};

use super::{RepositoryError, default_flag};
use crate::models::address::DEFAULT_COUNTRY;
use crate::models::{Address, AddressInput};

const TABLE: &str = "address";

const ADDRESS_COLUMNS: &str = "id, user_id, full_name, phone_number, address_line_1, \
     address_line_2, city, state, zip_code, country, is_default, address_type";

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: AddressId,
    user_id: UserId,
    full_name: String,
    phone_number: String,
    address_line_1: String,
    address_line_2: Option<String>,
    city: String,
    state: String,
    zip_code: String,
    country: String,
    is_default: bool,
    address_type: String,
}

impl TryFrom<AddressRow> for Address {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let address_type = row.address_type.parse::<AddressType>().map_err(|e| {
            RepositoryError::DataCorruption(format!("address {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            phone_number: row.phone_number,
            address_line_1: row.address_line_1,
            address_line_2: row.address_line_2,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
            is_default: row.is_default,
            address_type,
        })
    }
}

/// Repository for delivery addresses.
///
/// Every lookup is scoped to the owning user; another user's address behaves
/// exactly like a missing one.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's addresses, default first, then by city.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows: Vec<AddressRow> = sqlx::query_as(&format!(
            r"
            SELECT {ADDRESS_COLUMNS} FROM storefront.address
            WHERE user_id = $1
            ORDER BY is_default DESC, city ASC, id ASC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Address::try_from).collect()
    }

    /// An address, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM storefront.address WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Address::try_from).transpose()
    }

    /// Save a new address. The user's first address becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let is_default = !default_flag::user_has_rows(&mut tx, TABLE, user_id).await?;

        let row: AddressRow = sqlx::query_as(&format!(
            r"
            INSERT INTO storefront.address (
                user_id, full_name, phone_number, address_line_1, address_line_2,
                city, state, zip_code, country, is_default, address_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&input.full_name)
        .bind(input.phone_number.as_str())
        .bind(&input.address_line_1)
        .bind(input.address_line_2.as_deref())
        .bind(&input.city)
        .bind(&input.state)
        .bind(input.zip_code.as_str())
        .bind(DEFAULT_COUNTRY)
        .bind(is_default)
        .bind(input.address_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Address::try_from(row)
    }

    /// Replace an address's fields. The default flag is left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to someone else.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            r"
            UPDATE storefront.address
            SET full_name = $3, phone_number = $4, address_line_1 = $5,
                address_line_2 = $6, city = $7, state = $8, zip_code = $9,
                address_type = $10
            WHERE id = $1 AND user_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .bind(&input.full_name)
        .bind(input.phone_number.as_str())
        .bind(&input.address_line_1)
        .bind(input.address_line_2.as_deref())
        .bind(&input.city)
        .bind(&input.state)
        .bind(input.zip_code.as_str())
        .bind(input.address_type.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound).and_then(Address::try_from)
    }

    /// Delete an address. When it was the default, the most recently added
    /// remaining address takes over.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to someone else.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AddressId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if !default_flag::delete_owned(&mut tx, TABLE, id.as_i64(), user_id).await? {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Make an address the user's only default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to someone else.
    #[instrument(skip(self))]
    pub async fn set_default(&self, id: AddressId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if !default_flag::set_default(&mut tx, TABLE, id.as_i64(), user_id).await? {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }
}
