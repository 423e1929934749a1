//! Fresh Basket Core - Shared types library.
//!
//! This crate provides common types used across all Fresh Basket components:
//! - `api` - Storefront backend (catalog, auth, orders)
//! - `integration-tests` - In-process end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, phone numbers, prices,
//!   one-time login codes, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
