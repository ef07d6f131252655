//! Replaying adapter for the `Authenticator` port.

use super::{next_output, replay_result, SharedReplayer};
use crate::model::UserId;
use crate::ports::{AuthSession, Authenticator, PortFuture, SignUp};

/// Serves recorded sign-ins and session checks from a cassette.
pub struct ReplayingAuthenticator {
    replayer: SharedReplayer,
}

impl ReplayingAuthenticator {
    /// Creates a replaying authenticator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl Authenticator for ReplayingAuthenticator {
    fn sign_in<'a>(&'a self, _email: &'a str, _password: &'a str) -> PortFuture<'a, AuthSession> {
        let output = next_output(&self.replayer, "auth", "sign_in");
        Box::pin(async move { replay_result(output) })
    }

    fn sign_up<'a>(&'a self, _email: &'a str, _password: &'a str) -> PortFuture<'a, SignUp> {
        let output = next_output(&self.replayer, "auth", "sign_up");
        Box::pin(async move { replay_result(output) })
    }

    fn refresh<'a>(&'a self, _refresh_token: &'a str) -> PortFuture<'a, AuthSession> {
        let output = next_output(&self.replayer, "auth", "refresh");
        Box::pin(async move { replay_result(output) })
    }

    fn current_user_id<'a>(&'a self, _access_token: &'a str) -> PortFuture<'a, Option<UserId>> {
        let output = next_output(&self.replayer, "auth", "current_user_id");
        Box::pin(async move { replay_result(output) })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::adapters::replaying::test_support::replayer;

    #[tokio::test]
    async fn replays_sessions_and_rejections() {
        let auth = ReplayingAuthenticator::new(replayer(&[
            ("auth", "sign_in", json!({"Err": "Invalid login credentials"})),
            (
                "auth",
                "sign_in",
                json!({"Ok": {"user_id": "u1", "email": "ada@example.com", "access_token": "<redacted>"}}),
            ),
            ("auth", "current_user_id", json!({"Ok": null})),
            (
                "auth",
                "refresh",
                json!({"Ok": {"user_id": "u1", "email": "ada@example.com",
                    "access_token": "<redacted>", "refresh_token": "<redacted>"}}),
            ),
            (
                "auth",
                "sign_up",
                json!({"Ok": {"user_id": "u2", "email": "bo@example.com", "session": null}}),
            ),
        ]));

        let err = auth.sign_in("ada@example.com", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        let session = auth.sign_in("ada@example.com", "y").await.unwrap();
        assert_eq!(session.user_id, UserId::from("u1"));
        assert_eq!(auth.current_user_id("tok").await.unwrap(), None);
        let renewed = auth.refresh("ref").await.unwrap();
        assert_eq!(renewed.user_id, UserId::from("u1"));
        assert_eq!(renewed.expires_at, None);
        let signed_up = auth.sign_up("bo@example.com", "pw").await.unwrap();
        assert_eq!(signed_up.user_id, UserId::from("u2"));
        assert!(signed_up.session.is_none());
    }
}
