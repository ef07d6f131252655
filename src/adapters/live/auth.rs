//! Live adapter for the `Authenticator` port using the backend's auth service.

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::http::{send, BackendClient};
use crate::error::PortError;
use crate::model::UserId;
use crate::ports::{AuthSession, Authenticator, PortFuture, SignUp};

/// Email/password authentication against `/auth/v1`.
///
/// A successful sign-in stores the access token on the shared client, so the
/// store and avatar adapters built from it act as the signed-in user.
pub struct LiveAuthenticator {
    client: BackendClient,
}

impl LiveAuthenticator {
    /// Creates an authenticator sharing the given client.
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    async fn post_token<B: Serialize + Sync>(
        &self,
        path: &str,
        what: &str,
        body: &B,
    ) -> Result<TokenResponse, PortError> {
        let request = self.client.request(Method::POST, path).json(body);
        let body = send(request, what).await?;
        serde_json::from_str(&body)
            .map_err(|e| -> PortError { format!("{what}: unexpected response: {e}").into() })
    }

    async fn exchange(
        &self,
        path: &str,
        what: &str,
        body: impl Serialize + Sync,
    ) -> Result<AuthSession, PortError> {
        let response = self.post_token(path, what, &body).await?;
        let session = response.into_session(what, Utc::now())?;
        self.client.set_access_token(Some(&session.access_token));
        Ok(session)
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Body of `/token` and `/signup` responses.
///
/// A sign-up that still needs email confirmation returns the bare user
/// object instead, so `id` and `email` may sit at the top level.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: Option<AuthUser>,
    id: Option<String>,
    email: Option<String>,
}

impl TokenResponse {
    fn user(&self) -> Option<AuthUser> {
        self.user.clone().or_else(|| {
            self.id.clone().map(|id| AuthUser { id, email: self.email.clone() })
        })
    }

    fn expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match (self.expires_at, self.expires_in) {
            (Some(at), _) => DateTime::from_timestamp(at, 0),
            (None, Some(secs)) => Some(now + TimeDelta::seconds(secs)),
            (None, None) => None,
        }
    }

    fn into_session(self, what: &str, now: DateTime<Utc>) -> Result<AuthSession, PortError> {
        let user = self
            .user()
            .ok_or_else(|| -> PortError { format!("{what}: response carried no user").into() })?;
        let expires_at = self.expiry(now);
        let access_token = self
            .access_token
            .ok_or_else(|| -> PortError { format!("{what}: response carried no session").into() })?;
        Ok(AuthSession {
            user_id: UserId::from(user.id),
            email: user.email.unwrap_or_default(),
            access_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            expires_at,
        })
    }
}

#[derive(Clone, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

impl Authenticator for LiveAuthenticator {
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> PortFuture<'a, AuthSession> {
        Box::pin(async move {
            let credentials = Credentials { email, password };
            let mut session =
                self.exchange("/auth/v1/token?grant_type=password", "sign in", credentials).await?;
            if session.email.is_empty() {
                session.email = email.to_string();
            }
            Ok(session)
        })
    }

    fn sign_up<'a>(&'a self, email: &'a str, password: &'a str) -> PortFuture<'a, SignUp> {
        Box::pin(async move {
            let what = "sign up";
            let response =
                self.post_token("/auth/v1/signup", what, &Credentials { email, password }).await?;
            let user = response
                .user()
                .ok_or_else(|| -> PortError { format!("{what}: response carried no user").into() })?;
            let session = if response.access_token.is_some() {
                let mut session = response.into_session(what, Utc::now())?;
                if session.email.is_empty() {
                    session.email = email.to_string();
                }
                self.client.set_access_token(Some(&session.access_token));
                Some(session)
            } else {
                None
            };
            Ok(SignUp {
                user_id: UserId::from(user.id),
                email: user.email.unwrap_or_else(|| email.to_string()),
                session,
            })
        })
    }

    fn refresh<'a>(&'a self, refresh_token: &'a str) -> PortFuture<'a, AuthSession> {
        Box::pin(self.exchange(
            "/auth/v1/token?grant_type=refresh_token",
            "refresh session",
            RefreshGrant { refresh_token },
        ))
    }

    fn current_user_id<'a>(&'a self, access_token: &'a str) -> PortFuture<'a, Option<UserId>> {
        Box::pin(async move {
            let failed = |e: reqwest::Error| -> PortError {
                format!("session check: request failed: {e}").into()
            };
            let response = self
                .client
                .request_as(Method::GET, "/auth/v1/user", access_token)
                .send()
                .await
                .map_err(failed)?;

            if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                return Ok(None);
            }
            if !response.status().is_success() {
                return Err(format!("session check ({})", response.status().as_u16()).into());
            }

            let user: AuthUser = response.json().await.map_err(|e| -> PortError {
                format!("session check: unexpected response: {e}").into()
            })?;
            Ok(Some(UserId::from(user.id)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfirmed_sign_up_still_names_the_user() {
        let body = r#"{"id":"u1","email":"a@example.com","confirmation_sent_at":"2024-01-01T00:00:00Z"}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.access_token.is_none());
        assert_eq!(parsed.user().unwrap().id, "u1");
        assert!(parsed.into_session("sign up", Utc::now()).is_err());
    }

    #[test]
    fn token_response_becomes_a_refreshable_session() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let body = r#"{"access_token":"tok","token_type":"bearer","expires_in":3600,
            "refresh_token":"ref","user":{"id":"u1","email":"a@example.com"}}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        let session = parsed.into_session("sign in", now).unwrap();
        assert_eq!(session.access_token, "tok");
        assert_eq!(session.refresh_token, "ref");
        assert_eq!(session.expires_at, Some(now + TimeDelta::seconds(3600)));
        assert_eq!(session.user_id, UserId::from("u1"));
    }

    #[test]
    fn absolute_expiry_wins_over_relative() {
        let body = r#"{"access_token":"tok","expires_in":60,"expires_at":1700003600,"user":{"id":"u1"}}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        let session = parsed.into_session("refresh session", Utc::now()).unwrap();
        assert_eq!(session.expires_at, DateTime::from_timestamp(1_700_003_600, 0));
        assert!(session.email.is_empty());
    }
}
