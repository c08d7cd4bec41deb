//! URL slugs for categories.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain letters, digits, hyphens and underscores")]
    InvalidCharacter,
}

/// A category slug such as `smartphone` or `home-audio`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Column width in the database.
    pub const MAX_LENGTH: usize = 100;

    /// Derive a slug from a category name: lowercase, spaces become hyphens,
    /// anything else outside `[a-z0-9_-]` is dropped.
    ///
    /// ```
    /// use zestify_core::Slug;
    ///
    /// assert_eq!(Slug::from_name("Home Audio").unwrap().as_str(), "home-audio");
    /// assert_eq!(Slug::from_name("Toys & Games").unwrap().as_str(), "toys--games");
    /// assert!(Slug::from_name("&&&").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when nothing usable is left of the name, or the
    /// result is longer than [`Slug::MAX_LENGTH`].
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let derived: String = name
            .trim()
            .to_lowercase()
            .replace(' ', "-")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        Self::parse(&derived)
    }

    /// Parse a slug taken from a URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the input is empty, too long, or contains
    /// anything other than ASCII letters, digits, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SlugError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Slug::from_name("Smartphone").unwrap().as_str(), "smartphone");
        assert_eq!(Slug::from_name("Music Gear").unwrap().as_str(), "music-gear");
    }

    #[test]
    fn test_from_name_agrees_with_parse() {
        assert_eq!(Slug::from_name("&&&"), Err(SlugError::Empty));
        assert_eq!(Slug::from_name("   "), Err(SlugError::Empty));
        assert!(matches!(
            Slug::from_name(&"a".repeat(101)),
            Err(SlugError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_accepts_url_safe_characters() {
        assert!(Slug::parse("home-audio").is_ok());
        assert!(Slug::parse("sports_2").is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse("../etc"), Err(SlugError::InvalidCharacter));
        assert!(matches!(
            Slug::parse(&"a".repeat(101)),
            Err(SlugError::TooLong { .. })
        ));
    }
}
