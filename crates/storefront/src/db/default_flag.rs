//! Shared handling of the per-user `is_default` flag.
//!
//! `address`, `saved_card` and `saved_upi` each allow at most one default
//! row per user, backed by a partial unique index. Every helper here runs
//! inside the caller's transaction, and `table` is always one of those
//! compile-time table names.
//!
//! Each entry point first locks the owning `users` row, so concurrent
//! default-flag changes for one user run one after another and never trip
//! the unique index.

use sqlx::{Postgres, Transaction};

use zestify_core::UserId;

use super::RepositoryError;

/// Take the per-user lock for the rest of the transaction.
async fn lock_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> Result<(), RepositoryError> {
    sqlx::query("SELECT 1 FROM storefront.users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Whether the user has any rows in `table`. Holds the user lock until the
/// transaction ends, so the answer stays true for a following insert.
pub(super) async fn user_has_rows(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    user_id: UserId,
) -> Result<bool, RepositoryError> {
    lock_user(tx, user_id).await?;
    let (exists,): (bool,) = sqlx::query_as(&format!(
        "SELECT EXISTS(SELECT 1 FROM storefront.{table} WHERE user_id = $1)"
    ))
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(exists)
}

/// Make `id` the user's only default row. Returns `false` when the row does
/// not exist or belongs to someone else, in which case nothing changes.
pub(super) async fn set_default(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    id: i64,
    user_id: UserId,
) -> Result<bool, RepositoryError> {
    lock_user(tx, user_id).await?;
    let owned: Option<(i64,)> = sqlx::query_as(&format!(
        "SELECT id FROM storefront.{table} WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;

    if owned.is_none() {
        return Ok(false);
    }

    sqlx::query(&format!(
        "UPDATE storefront.{table} SET is_default = FALSE WHERE user_id = $1 AND is_default"
    ))
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query(&format!(
        "UPDATE storefront.{table} SET is_default = TRUE WHERE id = $1"
    ))
    .bind(id)
    .execute(&mut **tx)
    .await?;

    Ok(true)
}

/// Mark the user's most recently added row as default, if any remain.
pub(super) async fn promote_latest(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    user_id: UserId,
) -> Result<(), RepositoryError> {
    sqlx::query(&format!(
        r"
        UPDATE storefront.{table} SET is_default = TRUE
        WHERE id = (
            SELECT id FROM storefront.{table}
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT 1
        )
        "
    ))
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Delete a row owned by the user, promoting a replacement default when
/// the deleted row was the default. Returns whether the row existed.
pub(super) async fn delete_owned(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    id: i64,
    user_id: UserId,
) -> Result<bool, RepositoryError> {
    lock_user(tx, user_id).await?;
    let deleted: Option<(bool,)> = sqlx::query_as(&format!(
        "DELETE FROM storefront.{table} WHERE id = $1 AND user_id = $2 RETURNING is_default"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;

    match deleted {
        Some((true,)) => {
            promote_latest(tx, table, user_id).await?;
            Ok(true)
        }
        Some((false,)) => Ok(true),
        None => Ok(false),
    }
}
