//! Live adapter for the `AvatarStore` port using the backend's object storage.

use reqwest::Method;

use super::http::{send, BackendClient};
use crate::model::{AvatarImage, UserId};
use crate::ports::{AvatarStore, PortFuture};

/// Uploads avatars to `/storage/v1/object/{bucket}`, one object per user.
pub struct LiveAvatarStore {
    client: BackendClient,
}

impl LiveAvatarStore {
    /// Creates an avatar store sharing the given client.
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn object_key(&self, user_id: &UserId, image: &AvatarImage) -> String {
        format!("{}/{user_id}.{}", self.client.config().avatar_bucket, image.extension())
    }
}

impl AvatarStore for LiveAvatarStore {
    fn upload_avatar<'a>(
        &'a self,
        user_id: &'a UserId,
        image: &'a AvatarImage,
    ) -> PortFuture<'a, String> {
        Box::pin(async move {
            let key = self.object_key(user_id, image);
            let request = self
                .client
                .request(Method::POST, &format!("/storage/v1/object/{key}"))
                .header("x-upsert", "true")
                .header("content-type", &image.content_type)
                .body(image.bytes.clone());
            send(request, "avatar upload").await?;
            Ok(self.client.url(&format!("/storage/v1/object/public/{key}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    #[test]
    fn object_key_uses_bucket_user_and_extension() {
        let store = LiveAvatarStore::new(BackendClient::new(BackendConfig {
            url: "https://db.example.com".into(),
            anon_key: "anon".into(),
            avatar_bucket: "avatars".into(),
        }));
        let image = AvatarImage { content_type: "image/png".into(), bytes: vec![1, 2] };
        assert_eq!(store.object_key(&UserId::from("u1"), &image), "avatars/u1.png");
    }
}
