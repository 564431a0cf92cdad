//! Business services for the storefront.
//!
//! Services sit between the HTTP routes and the repositories: they own the
//! cross-table rules (cart reconciliation, checkout fees, the checkout
//! transaction) and return immutable snapshots for handlers to serialize.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod shipping;
