//! Recording adapter for the `AvatarStore` port.

use serde_json::json;

use super::{record_result, SharedRecorder};
use crate::model::{AvatarImage, UserId};
use crate::ports::{AvatarStore, PortFuture};

/// Records avatar uploads while delegating to an inner implementation.
///
/// The image itself is summarized by type and size to keep cassettes small.
pub struct RecordingAvatarStore {
    inner: Box<dyn AvatarStore>,
    recorder: SharedRecorder,
}

impl RecordingAvatarStore {
    /// Creates a new recording avatar store wrapping the given implementation.
    pub fn new(inner: Box<dyn AvatarStore>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl AvatarStore for RecordingAvatarStore {
    fn upload_avatar<'a>(
        &'a self,
        user_id: &'a UserId,
        image: &'a AvatarImage,
    ) -> PortFuture<'a, String> {
        Box::pin(async move {
            let result = self.inner.upload_avatar(user_id, image).await;
            let input = json!({
                "user_id": user_id,
                "content_type": image.content_type,
                "bytes": image.bytes.len(),
            });
            record_result(&self.recorder, "avatars", "upload_avatar", &input, &result);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryBackend;
    use crate::adapters::recording::test_support::{interactions, recorder};

    #[tokio::test]
    async fn summarizes_the_uploaded_image() {
        let recorder = recorder(&std::env::temp_dir().join("linkhub_rec_avatar.cassette.yaml"));
        let store = RecordingAvatarStore::new(Box::new(MemoryBackend::new()), recorder.clone());
        let image = AvatarImage { content_type: "image/png".into(), bytes: vec![0; 64] };

        let url = store.upload_avatar(&UserId::from("u1"), &image).await.unwrap();

        let recorded = interactions(&recorder);
        assert_eq!(recorded[0].input, json!({"user_id": "u1", "content_type": "image/png", "bytes": 64}));
        assert_eq!(recorded[0].output, json!({ "Ok": url }));
    }
}
