//! Authentication error types.
//!
//! Most variants carry the exact message shown to the user in a flash.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("{0}")]
    InvalidEmail(#[from] zestify_core::EmailError),

    /// Username is empty, too long or has characters outside `[\w.@+-]`.
    #[error(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
    )]
    InvalidUsername,

    /// Password too short.
    #[error("Password must be at least {0} characters.")]
    WeakPassword(usize),

    /// Password and confirmation differ.
    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("That username is already taken.")]
    UsernameTaken,

    #[error("That email is already in use.")]
    EmailTaken,

    /// Email login for an address with no account.
    #[error("No account found with this email.")]
    EmailNotFound,

    /// Wrong password, or a username that does not exist.
    #[error("Incorrect password.")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the message is meant for the user rather than the logs.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}
