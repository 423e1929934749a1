//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fresh_basket_core::{Phone, UserId};

/// A storefront user (domain type).
///
/// Created on the first login-code request for a phone number. Name and
/// address are optional profile fields the user may never fill in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized phone number, unique.
    pub phone: Phone,
    /// Display name, if provided.
    pub name: Option<String>,
    /// Default delivery address, if provided.
    pub address: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
