//! Locally persisted blobs.
//!
//! The backend owns every record; the only bytes the frontend keeps are
//! avatar images, mirrored here so profile pages render them without a
//! backend round trip.

pub mod avatars;

pub use avatars::{AvatarError, AvatarStore};
