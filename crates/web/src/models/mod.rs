//! Data models for the web frontend.

pub mod session;

pub use session::{CurrentUser, session_keys};
