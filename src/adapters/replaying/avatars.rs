//! Replaying adapter for the `AvatarStore` port.

use super::{next_output, replay_result, SharedReplayer};
use crate::model::{AvatarImage, UserId};
use crate::ports::{AvatarStore, PortFuture};

/// Serves recorded avatar upload results from a cassette.
pub struct ReplayingAvatarStore {
    replayer: SharedReplayer,
}

impl ReplayingAvatarStore {
    /// Creates a replaying avatar store backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl AvatarStore for ReplayingAvatarStore {
    fn upload_avatar<'a>(
        &'a self,
        _user_id: &'a UserId,
        _image: &'a AvatarImage,
    ) -> PortFuture<'a, String> {
        let output = next_output(&self.replayer, "avatars", "upload_avatar");
        Box::pin(async move { replay_result(output) })
    }
}
