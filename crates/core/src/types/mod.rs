//! Core newtypes for Nightbloom.
//!
//! Type-safe wrappers for common domain scalars.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, SalePrice};
pub use status::*;
