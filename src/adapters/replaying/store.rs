//! Replaying adapter for the `ProfileStore` port.

use chrono::{DateTime, Utc};

use super::{next_output, replay_result, SharedReplayer};
use crate::model::{Link, LinkId, PositionedLink, Profile, UserId};
use crate::ports::{PortFuture, ProfileStore};

/// Serves recorded table reads and write outcomes from a cassette.
pub struct ReplayingProfileStore {
    replayer: SharedReplayer,
}

impl ReplayingProfileStore {
    /// Creates a replaying store backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }

    fn replay<'a, T>(&self, method: &str) -> PortFuture<'a, T>
    where
        T: serde::de::DeserializeOwned + Send + 'a,
    {
        let output = next_output(&self.replayer, "store", method);
        Box::pin(async move { replay_result(output) })
    }
}

impl ProfileStore for ReplayingProfileStore {
    fn fetch_profile<'a>(&'a self, _user_id: &'a UserId) -> PortFuture<'a, Profile> {
        self.replay("fetch_profile")
    }

    fn fetch_profile_by_username<'a>(
        &'a self,
        _username: &'a str,
    ) -> PortFuture<'a, Option<(UserId, Profile)>> {
        self.replay("fetch_profile_by_username")
    }

    fn fetch_links<'a>(&'a self, _user_id: &'a UserId) -> PortFuture<'a, Vec<Link>> {
        self.replay("fetch_links")
    }

    fn insert_profile<'a>(
        &'a self,
        _user_id: &'a UserId,
        _profile: &'a Profile,
    ) -> PortFuture<'a, ()> {
        self.replay("insert_profile")
    }

    fn upsert_profile<'a>(
        &'a self,
        _user_id: &'a UserId,
        _profile: &'a Profile,
        _updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        self.replay("upsert_profile")
    }

    fn upsert_links<'a>(
        &'a self,
        _user_id: &'a UserId,
        _links: &'a [PositionedLink],
        _updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        self.replay("upsert_links")
    }

    fn delete_links<'a>(&'a self, _ids: &'a [LinkId]) -> PortFuture<'a, ()> {
        self.replay("delete_links")
    }
}
