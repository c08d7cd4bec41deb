//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. Cookies are
//! signed with `STOREFRONT_SESSION_SECRET`.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "zestify_session";

/// Schema holding the session table (created by migration).
pub const SESSION_SCHEMA: &str = "storefront";

/// Session table name.
pub const SESSION_TABLE: &str = "session";

/// Session expiry time in seconds (14 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Errors building the session layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionSetupError {
    #[error("invalid session store identifier: {0}")]
    Store(String),
    #[error("session secret is not a valid signing key: {0}")]
    Key(String),
}

/// Build the `PostgreSQL` session store used by the layer and by the
/// expired-session cleanup task.
///
/// # Errors
///
/// Returns an error if the schema or table name is rejected by the store.
pub fn create_session_store(pool: &PgPool) -> Result<PostgresStore, SessionSetupError> {
    PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .and_then(|store| store.with_table_name(SESSION_TABLE))
        .map_err(SessionSetupError::Store)
}

/// Create the session layer with the given store.
///
/// # Errors
///
/// Returns an error if the session secret cannot be used as a signing key.
pub fn create_session_layer(
    store: PostgresStore,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<PostgresStore, tower_sessions::service::SignedCookie>, SessionSetupError>
{
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())
        .map_err(|e| SessionSetupError::Key(e.to_string()))?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
