//! Delivery address types.

use zestify_core::{AddressId, AddressType, PhoneNumber, Pincode, UserId, state_name};

/// Country recorded on every address.
pub const DEFAULT_COUNTRY: &str = "India";

/// A saved delivery address.
#[derive(Debug, Clone)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub full_name: String,
    pub phone_number: String,
    /// Area and street.
    pub address_line_1: String,
    /// Locality.
    pub address_line_2: Option<String>,
    pub city: String,
    /// State or union territory code, e.g. `KA`.
    pub state: String,
    /// Pincode.
    pub zip_code: String,
    pub country: String,
    pub is_default: bool,
    pub address_type: AddressType,
}

impl Address {
    /// Display name of the state, falling back to the stored code.
    #[must_use]
    pub fn state_name(&self) -> &str {
        state_name(&self.state).unwrap_or(&self.state)
    }
}

/// A validated address ready to be stored.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub full_name: String,
    pub phone_number: PhoneNumber,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: Pincode,
    pub address_type: AddressType,
}
