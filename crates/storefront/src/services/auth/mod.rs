//! Authentication service.
//!
//! Username/email + password accounts with Argon2id hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use zestify_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// A registration form after trimming.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub username: &'r str,
    pub email: &'r str,
    pub password: &'r str,
    pub confirm_password: &'r str,
}

/// Authentication service.
///
/// Handles user registration and login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// Checks run in the order the user sees them: matching passwords,
    /// field formats, then uniqueness.
    ///
    /// # Errors
    ///
    /// Returns a user-facing variant for any validation failure and
    /// `AuthError::Repository` when the database fails.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        validate_username(form.username)?;
        let email = Email::parse(form.email)?;
        validate_password(form.password)?;

        if self.users.username_exists(form.username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.email_in_use(&email, None).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(form.password)?;

        // A concurrent registration can still win the race; the unique
        // constraints report which field collided.
        self.users
            .create(form.username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(field) if field == "email" => AuthError::EmailTaken,
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })
    }

    /// Log in with a username, or with an email when the identifier
    /// contains `@`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailNotFound` for an unknown email and
    /// `AuthError::InvalidCredentials` for a wrong password or unknown
    /// username.
    #[instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, AuthError> {
        let identifier = identifier.trim();

        let found = if identifier.contains('@') {
            let email = Email::parse(identifier).map_err(|_| AuthError::EmailNotFound)?;
            Some(
                self.users
                    .get_with_hash_by_email(&email)
                    .await?
                    .ok_or(AuthError::EmailNotFound)?,
            )
        } else {
            self.users.get_with_hash_by_username(identifier).await?
        };

        let (user, password_hash) = found.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Usernames are 1-150 characters of letters, digits and `@.+-_`.
///
/// # Errors
///
/// Returns `AuthError::InvalidUsername` otherwise.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let valid = !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidUsername)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("asha_rao").is_ok());
        assert!(validate_username("a.b+c-d@e").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
        assert!(validate_username(&"x".repeat(150)).is_ok());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(8))
        ));
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(AuthError::PasswordMismatch.to_string(), "Passwords do not match!");
        assert_eq!(
            AuthError::EmailNotFound.to_string(),
            "No account found with this email."
        );
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Incorrect password.");
        assert!(AuthError::UsernameTaken.is_user_facing());
        assert!(!AuthError::PasswordHash.is_user_facing());
    }
}
