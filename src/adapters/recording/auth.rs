//! Recording adapter for the `Authenticator` port.

use serde_json::json;

use super::{record_result, SharedRecorder};
use crate::model::UserId;
use crate::ports::{AuthSession, Authenticator, PortFuture, SignUp};

/// Placeholder stored in cassettes instead of real access tokens.
pub const REDACTED_TOKEN: &str = "<redacted>";

/// Records authentication calls while delegating to an inner implementation.
///
/// Only the email is kept as input; passwords and issued tokens are not.
pub struct RecordingAuthenticator {
    inner: Box<dyn Authenticator>,
    recorder: SharedRecorder,
}

impl RecordingAuthenticator {
    /// Creates a new recording authenticator wrapping the given implementation.
    pub fn new(inner: Box<dyn Authenticator>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }

    fn record_session<E: std::fmt::Display>(
        &self,
        method: &str,
        input: &serde_json::Value,
        result: &Result<AuthSession, E>,
    ) {
        let redacted = result.as_ref().map(redact);
        record_result(&self.recorder, "auth", method, input, &redacted);
    }
}

fn redact(session: &AuthSession) -> AuthSession {
    AuthSession {
        access_token: REDACTED_TOKEN.to_string(),
        refresh_token: REDACTED_TOKEN.to_string(),
        ..session.clone()
    }
}

impl Authenticator for RecordingAuthenticator {
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> PortFuture<'a, AuthSession> {
        Box::pin(async move {
            let result = self.inner.sign_in(email, password).await;
            self.record_session("sign_in", &json!({ "email": email }), &result);
            result
        })
    }

    fn sign_up<'a>(&'a self, email: &'a str, password: &'a str) -> PortFuture<'a, SignUp> {
        Box::pin(async move {
            let result = self.inner.sign_up(email, password).await;
            let redacted = result.as_ref().map(|signed_up| SignUp {
                session: signed_up.session.as_ref().map(redact),
                ..signed_up.clone()
            });
            record_result(&self.recorder, "auth", "sign_up", &json!({ "email": email }), &redacted);
            result
        })
    }

    fn refresh<'a>(&'a self, refresh_token: &'a str) -> PortFuture<'a, AuthSession> {
        Box::pin(async move {
            let result = self.inner.refresh(refresh_token).await;
            self.record_session("refresh", &json!(null), &result);
            result
        })
    }

    fn current_user_id<'a>(&'a self, access_token: &'a str) -> PortFuture<'a, Option<UserId>> {
        Box::pin(async move {
            let result = self.inner.current_user_id(access_token).await;
            record_result(&self.recorder, "auth", "current_user_id", &(), &result);
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
    async fn never_records_secrets() {
        let backend = MemoryBackend::new();
        let recorder = recorder(&std::env::temp_dir().join("linkhub_rec_auth.cassette.yaml"));
        let auth = RecordingAuthenticator::new(Box::new(backend), recorder.clone());

        let session = auth.sign_up("ada@example.com", "hunter22").await.unwrap().session.unwrap();
        assert_ne!(session.access_token, REDACTED_TOKEN);
        assert!(auth.sign_in("ada@example.com", "wrong-password").await.is_err());
        let renewed = auth.refresh(&session.refresh_token).await.unwrap();

        let recorded = interactions(&recorder);
        let yaml = serde_yaml::to_string(&recorded).unwrap();
        assert!(!yaml.contains("hunter22"));
        for secret in [&session.access_token, &session.refresh_token, &renewed.refresh_token] {
            assert!(!yaml.contains(secret.as_str()));
        }
        assert_eq!(recorded[0].input, json!({"email": "ada@example.com"}));
        assert_eq!(recorded[0].output["Ok"]["session"]["access_token"], json!(REDACTED_TOKEN));
        assert!(recorded[1].output.get("Err").is_some());
        assert_eq!(recorded[2].output["Ok"]["refresh_token"], json!(REDACTED_TOKEN));
    }
}
