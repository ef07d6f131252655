//! Avatar object storage port.

use super::PortFuture;
use crate::model::{AvatarImage, UserId};

/// Stores avatar images and hands back their public URL.
pub trait AvatarStore: Send + Sync {
    /// Uploads (or replaces) the avatar of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected or the request fails.
    fn upload_avatar<'a>(
        &'a self,
        user_id: &'a UserId,
        image: &'a AvatarImage,
    ) -> PortFuture<'a, String>;
}
