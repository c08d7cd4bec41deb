//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use zestify_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login name, shown in the navigation bar.
    pub username: String,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart line map.
    pub const CART: &str = "cart";

    /// Key for pending flash messages.
    pub const FLASH_MESSAGES: &str = "flash_messages";
}
