//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use zestify_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

/// Columns selected for every user query.
const USER_COLUMNS: &str = "id, username, email, first_name, last_name, date_joined";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    date_joined: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            username: row.username,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            date_joined: row.date_joined,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Which unique column a write collided with.
fn conflict_for(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let field = match db_err.constraint() {
            Some(c) if c.contains("username") => "username",
            Some(c) if c.contains("email") => "email",
            _ => "user",
        };
        return RepositoryError::Conflict(field.to_owned());
    }
    RepositoryError::Database(err)
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM storefront.users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_hash_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM storefront.users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// Get a user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_hash_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM storefront.users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// Whether a username is already registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            r"SELECT EXISTS(SELECT 1 FROM storefront.users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether an email is registered to any account other than `except`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_in_use(
        &self,
        email: &Email,
        except: Option<UserId>,
    ) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS(
                SELECT 1 FROM storefront.users
                WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            ",
        )
        .bind(email)
        .bind(except)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict("username" | "email")` if either is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, email, password_hash))]
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO storefront.users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_for)?;

        User::try_from(row)
    }

    /// Update the editable profile fields. The username never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict("email")` if the email belongs to another account.
    #[instrument(skip(self, email))]
    pub async fn update_profile(
        &self,
        id: UserId,
        first_name: &str,
        last_name: &str,
        email: &Email,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r"
            UPDATE storefront.users
            SET first_name = $2, last_name = $3, email = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(conflict_for)?;

        row.ok_or(RepositoryError::NotFound).and_then(User::try_from)
    }
}
