//! Core types for Fresh Basket.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;

pub use code::{CodeError, OneTimeCode};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::Price;
pub use status::OrderStatus;
