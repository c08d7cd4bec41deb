//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Cookie signing secret (min 64 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8000)
//! - `STOREFRONT_MEDIA_DIR` - Uploaded product images (default: media)
//! - `STOREFRONT_STATIC_DIR` - CSS and other assets (default: crates/storefront/static)
//! - `STOREFRONT_CURRENCY` - Display currency (default: INR)
//! - `STOREFRONT_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use zestify_core::CurrencyCode;

/// Cookie signing keys must be at least 64 bytes.
const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a copied-from-docs secret (matched case-insensitively).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL, also used to recognise same-site referers
    pub base_url: String,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// Directory served under `/media`
    pub media_dir: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Currency used when rendering prices
    pub currency: CurrencyCode,
    pub log_json: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from the process environment, after merging in a
    /// `.env` file if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the session secret is too short or guessable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_owned()))?;

        let base_url = required("STOREFRONT_BASE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_owned(), e.to_string()))?;

        let session_secret = required("STOREFRONT_SESSION_SECRET")?;
        check_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        Ok(Self {
            database_url,
            host: parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or("STOREFRONT_PORT", 8000)?,
            base_url,
            session_secret: SecretString::from(session_secret),
            media_dir: parse_or("STOREFRONT_MEDIA_DIR", PathBuf::from("media"))?,
            static_dir: parse_or(
                "STOREFRONT_STATIC_DIR",
                PathBuf::from("crates/storefront/static"),
            )?,
            currency: parse_or("STOREFRONT_CURRENCY", CurrencyCode::INR)?,
            log_json: optional("STOREFRONT_LOG_JSON").is_some_and(|v| is_truthy(&v)),
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (controls `Secure` cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
}

/// A set, non-blank variable.
fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `key` when it is set, otherwise fall back to `default`.
fn parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    optional(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
    })
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject session secrets that are short, copied from a template, or
/// low-entropy.
fn check_session_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| Err(ConfigError::InsecureSecret(var_name.to_owned(), reason));

    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return insecure(format!(
            "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {})",
            secret.len()
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return insecure(format!("appears to be a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A configuration suitable for router tests. Nothing here touches the
    /// network.
    pub fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/zestify_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            session_secret: SecretString::from("k".repeat(64)),
            media_dir: PathBuf::from("media"),
            static_dir: PathBuf::from("static"),
            currency: CurrencyCode::INR,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaaaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    const RANDOM_63: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6-dE8%fG1(hJ3)kM5+nP7=qR9?sU2~vX4";

    #[test]
    fn test_session_secret_length() {
        assert_eq!(RANDOM_63.len(), 63);
        assert!(check_session_secret(RANDOM_63, "S").is_err());
        assert!(check_session_secret(&format!("{RANDOM_63}Z"), "S").is_ok());
    }

    #[test]
    fn test_session_secret_rejects_placeholder_and_low_entropy() {
        let placeholder = format!("changeme-{RANDOM_63}");
        assert!(matches!(
            check_session_secret(&placeholder, "S"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        assert!(matches!(
            check_session_secret(&"ab".repeat(40), "S"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("False"));
    }

    #[test]
    fn test_socket_addr_and_https() {
        let mut config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
        assert!(!config.is_https());

        config.base_url = "https://shop.zestify.in".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("zestify_test"));
        assert!(!debug_output.contains(&"k".repeat(64)));
    }
}
