//! Core types for Zestify.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod payment;
pub mod price;
pub mod slug;
pub mod status;

pub use address::{AddressError, INDIAN_STATES, PhoneNumber, Pincode, state_name, validate_state};
pub use email::{Email, EmailError};
pub use id::*;
pub use payment::{CardBrand, CardExpiry, CardNumber, PaymentError, UpiId, validate_cvv};
pub use price::{CurrencyCode, Price};
pub use slug::{Slug, SlugError};
pub use status::*;
