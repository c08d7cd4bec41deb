//! Database operations for the storefront `PostgreSQL` schema.
//!
//! # Schema: `storefront`
//!
//! - `users` - Site accounts (Argon2id password hashes)
//! - `category`, `product` - The catalog
//! - `orders` - Placed orders with a denormalized line summary
//! - `wishlist` - Saved products, unique per user and product
//! - `address` - Delivery addresses, at most one default per user
//! - `saved_card`, `saved_upi` - Saved payment methods, at most one default each
//! - `session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p zestify-cli -- migrate
//! ```

pub mod addresses;
pub mod categories;
mod default_flag;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use payment_methods::PaymentMethodRepository;
pub use products::ProductRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in database is invalid or corrupted.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Record not found.
    #[error("record not found")]
    NotFound,

    /// Unique constraint violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input rejected before it reached the database.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("phone"), "phone");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
