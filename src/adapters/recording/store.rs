//! Recording adapter for the `ProfileStore` port.

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{record_result, SharedRecorder};
use crate::model::{Link, LinkId, PositionedLink, Profile, UserId};
use crate::ports::{PortFuture, ProfileStore};

/// Records table reads and writes while delegating to an inner implementation.
pub struct RecordingProfileStore {
    inner: Box<dyn ProfileStore>,
    recorder: SharedRecorder,
}

impl RecordingProfileStore {
    /// Creates a new recording store wrapping the given implementation.
    pub fn new(inner: Box<dyn ProfileStore>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl ProfileStore for RecordingProfileStore {
    fn fetch_profile<'a>(&'a self, user_id: &'a UserId) -> PortFuture<'a, Profile> {
        Box::pin(async move {
            let result = self.inner.fetch_profile(user_id).await;
            record_result(&self.recorder, "store", "fetch_profile", user_id, &result);
            result
        })
    }

    fn fetch_profile_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> PortFuture<'a, Option<(UserId, Profile)>> {
        Box::pin(async move {
            let result = self.inner.fetch_profile_by_username(username).await;
            record_result(&self.recorder, "store", "fetch_profile_by_username", username, &result);
            result
        })
    }

    fn fetch_links<'a>(&'a self, user_id: &'a UserId) -> PortFuture<'a, Vec<Link>> {
        Box::pin(async move {
            let result = self.inner.fetch_links(user_id).await;
            record_result(&self.recorder, "store", "fetch_links", user_id, &result);
            result
        })
    }

    fn insert_profile<'a>(
        &'a self,
        user_id: &'a UserId,
        profile: &'a Profile,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let result = self.inner.insert_profile(user_id, profile).await;
            let input = json!({ "user_id": user_id, "profile": profile });
            record_result(&self.recorder, "store", "insert_profile", &input, &result);
            result
        })
    }

    fn upsert_profile<'a>(
        &'a self,
        user_id: &'a UserId,
        profile: &'a Profile,
        updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let result = self.inner.upsert_profile(user_id, profile, updated_at).await;
            let input = json!({ "user_id": user_id, "profile": profile, "updated_at": updated_at });
            record_result(&self.recorder, "store", "upsert_profile", &input, &result);
            result
        })
    }

    fn upsert_links<'a>(
        &'a self,
        user_id: &'a UserId,
        links: &'a [PositionedLink],
        updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let result = self.inner.upsert_links(user_id, links, updated_at).await;
            let input = json!({ "user_id": user_id, "links": links, "updated_at": updated_at });
            record_result(&self.recorder, "store", "upsert_links", &input, &result);
            result
        })
    }

    fn delete_links<'a>(&'a self, ids: &'a [LinkId]) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let result = self.inner.delete_links(ids).await;
            record_result(&self.recorder, "store", "delete_links", ids, &result);
            result
        })
    }
}
