//! Fresh Basket API library.
//!
//! This crate provides the storefront backend as a library, allowing the
//! router to be driven in-process by integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
