//! External service clients for the back office.

pub mod images;
pub mod provider;
