//! Authentication port for the hosted backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PortFuture;
use crate::model::UserId;

/// Credentials handed out after a successful sign-in or sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The signed-in user.
    pub user_id: UserId,
    /// Email the user signed in with.
    pub email: String,
    /// Bearer token for authenticated store and storage calls.
    pub access_token: String,
    /// Long-lived token exchanged for a new access token; empty if none was issued.
    #[serde(default)]
    pub refresh_token: String,
    /// When the access token stops being accepted, if the backend said.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// A session without refresh data.
    #[must_use]
    pub fn new(user_id: UserId, email: &str, access_token: &str) -> Self {
        Self {
            user_id,
            email: email.to_string(),
            access_token: access_token.to_string(),
            refresh_token: String::new(),
            expires_at: None,
        }
    }

    /// Whether the access token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether a refresh can be attempted.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Outcome of registering an account.
///
/// Backends that confirm emails create the account but issue no session
/// until the address is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUp {
    /// The new account.
    pub user_id: UserId,
    /// Email the account was registered with.
    pub email: String,
    /// Present when the backend signed the new user in right away.
    pub session: Option<AuthSession>,
}

/// Issues and checks user sessions.
pub trait Authenticator: Send + Sync {
    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error on bad credentials or transport failure.
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> PortFuture<'a, AuthSession>;

    /// Registers a new account, signing it in when the backend allows.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the request fails.
    fn sign_up<'a>(&'a self, email: &'a str, password: &'a str) -> PortFuture<'a, SignUp>;

    /// Exchanges a refresh token for a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is revoked or the request fails.
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> PortFuture<'a, AuthSession>;

    /// Resolves the user behind an access token, `None` if it is no longer valid.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport failures, not for expired tokens.
    fn current_user_id<'a>(&'a self, access_token: &'a str) -> PortFuture<'a, Option<UserId>>;
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn expiry_is_only_known_when_reported() {
        let now = Utc::now();
        let mut session = AuthSession::new(UserId::from("u1"), "a@b.c", "tok");
        assert!(!session.is_expired(now));
        assert!(!session.can_refresh());

        session.expires_at = Some(now - Duration::seconds(1));
        session.refresh_token = "r".into();
        assert!(session.is_expired(now));
        assert!(session.can_refresh());
    }

    #[test]
    fn sessions_saved_before_refresh_tokens_still_load() {
        let yaml = "user_id: u1\nemail: a@b.c\naccess_token: tok\n";
        let session: AuthSession = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(session, AuthSession::new(UserId::from("u1"), "a@b.c", "tok"));
    }
}
