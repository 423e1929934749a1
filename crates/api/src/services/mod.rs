//! Business services over the storage port.

pub mod auth;
pub mod catalog;
pub mod orders;

pub use auth::{AuthError, AuthService, AuthSession};
pub use catalog::{CatalogError, CatalogService};
pub use orders::{OrderError, OrderService};
