//! Live adapter for the `ProfileStore` port using the backend's REST tables.

use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::http::{send, BackendClient};
use crate::error::PortError;
use crate::model::{Avatar, Link, LinkId, PositionedLink, Profile, Theme, UserId};
use crate::ports::{PortFuture, ProfileStore};

const PROFILES: &str = "/rest/v1/profiles";
const LINKS: &str = "/rest/v1/links";

/// Reads and writes the `profiles` and `links` tables.
pub struct LiveProfileStore {
    client: BackendClient,
}

impl LiveProfileStore {
    /// Creates a store sharing the given client.
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<Vec<T>, PortError> {
        let request = self.client.request(Method::GET, path).query(&[("select", "*")]).query(query);
        let body = send(request, what).await?;
        serde_json::from_str(&body)
            .map_err(|e| -> PortError { format!("{what}: unexpected response: {e}").into() })
    }

    fn write(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, path).header("Prefer", "return=minimal")
    }
}

#[derive(Deserialize)]
struct ProfileRow {
    id: String,
    username: String,
    display_name: Option<String>,
    description: Option<String>,
    avatar: Option<String>,
    theme: Option<String>,
}

impl ProfileRow {
    fn into_profile(self) -> (UserId, Profile) {
        let profile = Profile {
            username: self.username,
            display_name: self.display_name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            avatar: self.avatar.filter(|a| !a.is_empty()).map(Avatar::from),
            theme: self.theme.and_then(|t| t.parse().ok()).unwrap_or(Theme::Light),
        };
        (UserId::from(self.id), profile)
    }
}

#[derive(Serialize)]
struct NewProfileRow<'a> {
    id: &'a UserId,
    username: &'a str,
    display_name: &'a str,
    description: &'a str,
    avatar: Option<&'a str>,
    theme: Theme,
}

#[derive(Serialize)]
struct ProfileUpdate<'a> {
    display_name: &'a str,
    description: &'a str,
    avatar: Option<&'a str>,
    theme: Theme,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct LinkRow {
    id: String,
    name: String,
    url: String,
    enabled: bool,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Self { id: LinkId::from(row.id), title: row.name, url: row.url, active: row.enabled }
    }
}

#[derive(Serialize)]
struct LinkWrite<'a> {
    id: &'a LinkId,
    profile_id: &'a UserId,
    name: &'a str,
    url: &'a str,
    enabled: bool,
    position: usize,
    updated_at: DateTime<Utc>,
}

/// PostgREST `in.(...)` filter value with each id quoted.
fn in_filter(ids: &[LinkId]) -> String {
    let quoted: Vec<String> =
        ids.iter().map(|id| format!("\"{}\"", id.as_str().replace('"', "\\\""))).collect();
    format!("in.({})", quoted.join(","))
}

impl ProfileStore for LiveProfileStore {
    fn fetch_profile<'a>(&'a self, user_id: &'a UserId) -> PortFuture<'a, Profile> {
        Box::pin(async move {
            let rows: Vec<ProfileRow> =
                self.select(PROFILES, &[("id", format!("eq.{user_id}"))], "fetch profile").await?;
            rows.into_iter()
                .next()
                .map(|row| row.into_profile().1)
                .ok_or_else(|| -> PortError { format!("profile not found for user {user_id}").into() })
        })
    }

    fn fetch_profile_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> PortFuture<'a, Option<(UserId, Profile)>> {
        Box::pin(async move {
            let rows: Vec<ProfileRow> = self
                .select(PROFILES, &[("username", format!("eq.{username}"))], "fetch profile")
                .await?;
            Ok(rows.into_iter().next().map(ProfileRow::into_profile))
        })
    }

    fn fetch_links<'a>(&'a self, user_id: &'a UserId) -> PortFuture<'a, Vec<Link>> {
        Box::pin(async move {
            let rows: Vec<LinkRow> = self
                .select(
                    LINKS,
                    &[
                        ("profile_id", format!("eq.{user_id}")),
                        ("order", "position.asc,created_at.asc".to_string()),
                    ],
                    "fetch links",
                )
                .await?;
            Ok(rows.into_iter().map(Link::from).collect())
        })
    }

    fn insert_profile<'a>(
        &'a self,
        user_id: &'a UserId,
        profile: &'a Profile,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let row = NewProfileRow {
                id: user_id,
                username: &profile.username,
                display_name: &profile.display_name,
                description: &profile.description,
                avatar: profile.avatar.as_ref().map(Avatar::as_str),
                theme: profile.theme,
            };
            send(self.write(Method::POST, PROFILES).json(&row), "create profile").await?;
            Ok(())
        })
    }

    fn upsert_profile<'a>(
        &'a self,
        user_id: &'a UserId,
        profile: &'a Profile,
        updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let update = ProfileUpdate {
                display_name: &profile.display_name,
                description: &profile.description,
                avatar: profile.avatar.as_ref().map(Avatar::as_str),
                theme: profile.theme,
                updated_at,
            };
            let request = self
                .write(Method::PATCH, PROFILES)
                .query(&[("id", format!("eq.{user_id}"))])
                .json(&update);
            send(request, "update profile").await?;
            Ok(())
        })
    }

    fn upsert_links<'a>(
        &'a self,
        user_id: &'a UserId,
        links: &'a [PositionedLink],
        updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let rows: Vec<LinkWrite<'_>> = links
                .iter()
                .map(|p| LinkWrite {
                    id: &p.link.id,
                    profile_id: user_id,
                    name: &p.link.title,
                    url: &p.link.url,
                    enabled: p.link.active,
                    position: p.position,
                    updated_at,
                })
                .collect();
            let request = self
                .client
                .request(Method::POST, LINKS)
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .query(&[("on_conflict", "id")])
                .json(&rows);
            send(request, "upsert links").await?;
            Ok(())
        })
    }

    fn delete_links<'a>(&'a self, ids: &'a [LinkId]) -> PortFuture<'a, ()> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(());
            }
            let request = self.write(Method::DELETE, LINKS).query(&[("id", in_filter(ids))]);
            send(request, "delete links").await?;
            Ok(())
        })
    }
}
