//! Nightbloom Core - Shared domain types.
//!
//! This crate provides the common types used across all Nightbloom components:
//! - `storefront` - Public-facing shop API (catalog, cart, checkout, orders)
//! - `admin` - Internal back office (catalog management, inventory, reports)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. The `postgres` feature adds sqlx codecs for the newtype wrappers
//! so the service crates can bind them directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses and roles
//! - [`catalog`] - Product, variant and category models
//! - [`cart`] - Cart and line-item models
//! - [`order`] - Order, snapshot-item and delivery-detail models

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;

pub use cart::*;
pub use catalog::*;
pub use order::*;
pub use types::*;
