//! Zestify Core - Shared domain types.
//!
//! This crate provides the types used across the Zestify components:
//! - `storefront` - The server-rendered shop
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Form input is parsed into these types at the edge so the
//! rest of the code only ever sees valid values.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, emails, statuses, slugs, Indian postal
//!   data and payment credentials

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
