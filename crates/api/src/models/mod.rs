//! Domain types for the storefront backend.
//!
//! These types represent validated domain objects separate from database
//! row types and wire DTOs.

pub mod order;
pub mod product;
pub mod user;

pub use order::{ItemRequest, Order, OrderItem};
pub use product::{Product, ProductSync};
pub use user::User;
