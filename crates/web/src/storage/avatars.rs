//! Filesystem-backed avatar store.
//!
//! Avatar bytes are keyed by user ID, one file per user, with the content
//! type recorded in the file extension. Saving replaces whatever was there;
//! a missing file is simply "no avatar", never an error.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::instrument;

use hermes_core::UserId;

/// Upload size cap, matching the backend's own limit.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Accepted content types and the extension each is stored under.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Errors that can occur when storing or loading an avatar.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The upload exceeds [`MAX_AVATAR_BYTES`].
    #[error("avatar must be at most {MAX_AVATAR_BYTES} bytes")]
    TooLarge,

    /// The upload is not one of the accepted image types.
    #[error("unsupported avatar content type: {0}")]
    UnsupportedType(String),
}

/// Filesystem-backed store for avatar images.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    root: PathBuf,
}

impl AvatarStore {
    /// Create a store rooted under `data_dir`. The directory is created
    /// lazily on the first save.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("avatars"),
        }
    }

    fn path_for(&self, user_id: UserId, ext: &str) -> PathBuf {
        self.root.join(format!("{user_id}.{ext}"))
    }

    /// Store an avatar, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes exceed the size cap, the content type
    /// is not an accepted image type, or the write fails.
    #[instrument(skip(self, bytes), fields(user_id = %user_id, size = bytes.len()))]
    pub async fn save(
        &self,
        user_id: UserId,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), AvatarError> {
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(AvatarError::TooLarge);
        }

        let ext = IMAGE_TYPES
            .iter()
            .find(|(mime, _)| *mime == content_type)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| AvatarError::UnsupportedType(content_type.to_string()))?;

        tokio::fs::create_dir_all(&self.root).await?;

        // Drop any previous avatar stored under a different extension
        for (_, other) in IMAGE_TYPES.iter().filter(|(_, e)| *e != ext) {
            match tokio::fs::remove_file(self.path_for(user_id, other)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        tokio::fs::write(self.path_for(user_id, ext), bytes).await?;
        Ok(())
    }

    /// Load a user's avatar, returning its content type and bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only on filesystem failure; a missing avatar is
    /// `Ok(None)`.
    pub async fn load(
        &self,
        user_id: UserId,
    ) -> Result<Option<(&'static str, Vec<u8>)>, AvatarError> {
        for (mime, ext) in IMAGE_TYPES.iter().copied() {
            match tokio::fs::read(self.path_for(user_id, ext)).await {
                Ok(bytes) => return Ok(Some((mime, bytes))),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    /// Whether a user has a stored avatar.
    pub async fn exists(&self, user_id: UserId) -> bool {
        for (_, ext) in IMAGE_TYPES {
            if tokio::fs::try_exists(self.path_for(user_id, ext))
                .await
                .unwrap_or(false)
            {
                return true;
            }
        }
        false
    }

    /// Remove a user's avatar if present.
    ///
    /// # Errors
    ///
    /// Returns an error on filesystem failure other than "not found".
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn remove(&self, user_id: UserId) -> Result<(), AvatarError> {
        for (_, ext) in IMAGE_TYPES {
            match tokio::fs::remove_file(self.path_for(user_id, ext)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
