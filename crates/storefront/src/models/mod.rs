//! Domain models for the storefront.
//!
//! Row types are mapped by the repositories in [`crate::db`]; form input is
//! validated into the `New*` types before it reaches a repository.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod flash;
pub mod order;
pub mod payment;
pub mod session;
pub mod user;

pub use address::{Address, AddressInput};
pub use cart::{CartLine, CartMap};
pub use catalog::{Category, Product};
pub use flash::{FlashLevel, FlashMessage};
pub use order::Order;
pub use payment::{NewCard, NewUpi, SavedCard, SavedUpi};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
