//! HTTP middleware: sessions and staff authentication.

pub mod auth;
pub mod session;

pub use session::create_session_layer;
