//! Profile and link storage port.

use chrono::{DateTime, Utc};

use super::PortFuture;
use crate::model::{Link, LinkId, PositionedLink, Profile, UserId};

/// Relational storage of profiles and their links.
///
/// Links come back in display order: by explicit position, then creation time.
pub trait ProfileStore: Send + Sync {
    /// Loads the profile owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is missing or the request fails.
    fn fetch_profile<'a>(&'a self, user_id: &'a UserId) -> PortFuture<'a, Profile>;

    /// Looks a profile up by its public username.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; an unknown username is `Ok(None)`.
    fn fetch_profile_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> PortFuture<'a, Option<(UserId, Profile)>>;

    /// Loads every link of a profile, active or not, in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn fetch_links<'a>(&'a self, user_id: &'a UserId) -> PortFuture<'a, Vec<Link>>;

    /// Creates the profile row for a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the row exists or the request fails.
    fn insert_profile<'a>(&'a self, user_id: &'a UserId, profile: &'a Profile)
        -> PortFuture<'a, ()>;

    /// Overwrites the mutable profile fields. The username is never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn upsert_profile<'a>(
        &'a self,
        user_id: &'a UserId,
        profile: &'a Profile,
        updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()>;

    /// Inserts or replaces links by id, storing each one's position.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn upsert_links<'a>(
        &'a self,
        user_id: &'a UserId,
        links: &'a [PositionedLink],
        updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()>;

    /// Deletes links by id. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn delete_links<'a>(&'a self, ids: &'a [LinkId]) -> PortFuture<'a, ()>;
}
