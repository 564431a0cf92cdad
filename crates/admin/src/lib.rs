//! Nightbloom back office library.
//!
//! Catalog, inventory, order and role management for staff. Served as a
//! separate binary so the public storefront never links against any of
//! the write paths.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod reports;
pub mod routes;
pub mod services;
pub mod state;
