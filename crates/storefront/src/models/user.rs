//! User domain types.

use chrono::{DateTime, Utc};

use zestify_core::{Email, UserId};

use super::session::CurrentUser;

/// A storefront account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name. Never changes after registration.
    pub username: String,
    /// User's email address.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Full name if one was given, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }

    /// The identity stored in the session after login.
    #[must_use]
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId::new(1),
            username: "asha".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(user("Asha", "Rao").display_name(), "Asha Rao");
        assert_eq!(user("Asha", "").display_name(), "Asha");
        assert_eq!(user(" ", "").display_name(), "asha");
    }
}
