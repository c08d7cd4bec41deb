//! Business logic services for the storefront.
//!
//! - `auth` - Registration and password login
//! - `cart` - The session cart and its ghost-item cleanup
//! - `flash` - One-shot session notices

pub mod auth;
pub mod cart;
pub mod flash;
