//! `storefront` - Product catalog and shopping cart store
//!
//! This crate keeps a product catalog and a shopping cart in `SQLite` through `SeaORM`.
//! Cart lines are snapshots of products plus a quantity, and the cart listing and
//! running total are live views pushed to subscribers after every committed write.

#![deny(unsafe_code, unused_must_use, rustdoc::broken_intra_doc_links)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    // Store code propagates errors; only tests may unwrap
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::dbg_macro,
    clippy::float_cmp,
    rust_2018_idioms,
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

/// Configuration management for database and catalog seeding
pub mod config;
/// Core business logic - catalog and cart stores with live views
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// HTTP client for the remote product service
pub mod remote;

pub use crate::core::{
    Storefront,
    cart::{CartStore, NewCartLine},
    catalog::{CatalogStore, NewProduct},
    live::Subscription,
    repository::{CatalogRepository, Fetched, Source},
};
pub use errors::{Error, Result};

#[cfg(test)]
pub mod test_utils;
