//! The signed-in user and their draft, persisted between CLI runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::ServiceContext;
use crate::draft::{DraftEngine, SyncReport};
use crate::error::{HubError, RemoteStage, Result};
use crate::model::{Profile, UserId};
use crate::ports::{AuthSession, FileSystem};

/// Credentials plus the draft engine of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Present once signed in.
    pub auth: Option<AuthSession>,
    /// Profile of an account still waiting for email confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_profile: Option<PendingProfile>,
    /// Draft, baseline and dirty flag.
    pub engine: DraftEngine,
}

/// Username claimed at sign-up, created on the account's first login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingProfile {
    /// Account the profile belongs to.
    pub user_id: UserId,
    /// Validated username to create the profile with.
    pub username: String,
}

/// Result of [`Session::sign_up`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Signed in with the new profile loaded as the draft.
    Ready(Profile),
    /// The backend wants the email confirmed before issuing a session.
    AwaitingConfirmation {
        /// Address the confirmation was sent to.
        email: String,
        /// Username reserved for the first login.
        username: String,
    },
}

impl Session {
    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unauthenticated`] when nobody is signed in.
    pub fn user_id(&self) -> Result<&UserId> {
        self.auth.as_ref().map(|a| &a.user_id).ok_or(HubError::Unauthenticated)
    }

    /// Bearer token of the signed-in user.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.access_token.as_str())
    }

    /// Adopts new credentials. A different user starts from an empty draft.
    pub fn sign_in(&mut self, auth: AuthSession) {
        if self.auth.as_ref().map(|a| &a.user_id) != Some(&auth.user_id) {
            self.engine = DraftEngine::new();
        }
        self.auth = Some(auth);
    }

    /// Signs in with email and password.
    ///
    /// The first login of an account created while awaiting email
    /// confirmation also creates its profile.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Remote`] at the auth stage when the credentials
    /// are rejected, or at the profile stage when the pending profile cannot
    /// be created.
    pub async fn login(&mut self, ctx: &ServiceContext, email: &str, password: &str) -> Result<()> {
        let auth = ctx
            .auth
            .sign_in(email.trim(), password)
            .await
            .map_err(|e| HubError::remote(RemoteStage::Auth, &e))?;
        ctx.set_access_token(Some(&auth.access_token));
        info!(user_id = %auth.user_id, "signed in");
        self.sign_in(auth);
        self.create_pending_profile(ctx).await
    }

    async fn create_pending_profile(&mut self, ctx: &ServiceContext) -> Result<()> {
        let user_id = self.user_id()?.clone();
        let Some(pending) = self.pending_profile.as_ref().filter(|p| p.user_id == user_id) else {
            return Ok(());
        };
        let profile = Profile::for_new_user(&pending.username)?;
        ctx.store
            .insert_profile(&user_id, &profile)
            .await
            .map_err(|e| HubError::remote(RemoteStage::ProfileUpsert, &e))?;
        info!(user_id = %user_id, username = %profile.username, "profile created");
        self.pending_profile = None;
        Ok(())
    }

    /// Creates an account and its profile, then signs in.
    ///
    /// The new profile becomes the loaded draft, so editing can start right
    /// away. When the backend issues no session until the email is
    /// confirmed, or the profile insert fails, the username is kept as a
    /// [`PendingProfile`] and the profile is created by the next
    /// [`Session::login`] of that account.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for malformed or taken usernames and
    /// [`HubError::Remote`] when the backend refuses the account or profile.
    pub async fn sign_up(
        &mut self,
        ctx: &ServiceContext,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<SignUpOutcome> {
        let profile = Profile::for_new_user(username)?;

        let taken = ctx
            .store
            .fetch_profile_by_username(&profile.username)
            .await
            .map_err(|e| HubError::remote(RemoteStage::Fetch, &e))?;
        if taken.is_some() {
            return Err(HubError::Validation(format!(
                "username {:?} is already taken",
                profile.username
            )));
        }

        let signed_up = ctx
            .auth
            .sign_up(email.trim(), password)
            .await
            .map_err(|e| HubError::remote(RemoteStage::Auth, &e))?;
        self.pending_profile = Some(PendingProfile {
            user_id: signed_up.user_id.clone(),
            username: profile.username.clone(),
        });
        let Some(auth) = signed_up.session else {
            info!(user_id = %signed_up.user_id, "account created; awaiting email confirmation");
            return Ok(SignUpOutcome::AwaitingConfirmation {
                email: signed_up.email,
                username: profile.username,
            });
        };
        ctx.set_access_token(Some(&auth.access_token));

        ctx.store
            .insert_profile(&auth.user_id, &profile)
            .await
            .map_err(|e| HubError::remote(RemoteStage::ProfileUpsert, &e))?;
        info!(user_id = %auth.user_id, username = %profile.username, "account created");

        self.pending_profile = None;
        self.sign_in(auth);
        self.engine.load(profile.clone(), Vec::new());
        Ok(SignUpOutcome::Ready(profile))
    }

    /// Confirms with the backend that the stored token is still valid.
    ///
    /// An expired or rejected access token is exchanged once for a new one
    /// when a refresh token is on hand.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unauthenticated`] when there is no token or the
    /// backend no longer accepts it and it cannot be refreshed.
    pub async fn verify(&mut self, ctx: &ServiceContext) -> Result<UserId> {
        let auth = self.auth.as_ref().ok_or(HubError::Unauthenticated)?;
        let can_refresh = auth.can_refresh();
        if auth.is_expired(ctx.clock.now()) && can_refresh {
            debug!("access token expired");
            self.refresh(ctx).await?;
            return self.current_user(ctx).await?.ok_or(HubError::Unauthenticated);
        }
        if let Some(user_id) = self.current_user(ctx).await? {
            return Ok(user_id);
        }
        if !can_refresh {
            return Err(HubError::Unauthenticated);
        }
        self.refresh(ctx).await?;
        self.current_user(ctx).await?.ok_or(HubError::Unauthenticated)
    }

    /// The signed-in user if the backend accepts the access token, `None`
    /// if it rejects it.
    async fn current_user(&self, ctx: &ServiceContext) -> Result<Option<UserId>> {
        let auth = self.auth.as_ref().ok_or(HubError::Unauthenticated)?;
        let current = ctx
            .auth
            .current_user_id(&auth.access_token)
            .await
            .map_err(|e| HubError::remote(RemoteStage::Auth, &e))?;
        match current {
            Some(user_id) if user_id == auth.user_id => Ok(Some(user_id)),
            Some(_) => Err(HubError::Unauthenticated),
            None => Ok(None),
        }
    }

    async fn refresh(&mut self, ctx: &ServiceContext) -> Result<()> {
        let auth = self.auth.as_ref().ok_or(HubError::Unauthenticated)?;
        let mut renewed = ctx.auth.refresh(&auth.refresh_token).await.map_err(|e| {
            warn!(error = %e, "session refresh failed");
            HubError::Unauthenticated
        })?;
        if renewed.user_id != auth.user_id {
            return Err(HubError::Unauthenticated);
        }
        if renewed.email.is_empty() {
            renewed.email.clone_from(&auth.email);
        }
        ctx.set_access_token(Some(&renewed.access_token));
        info!(user_id = %renewed.user_id, "session refreshed");
        self.auth = Some(renewed);
        Ok(())
    }

    /// Fetches the profile and links and loads them into the draft.
    ///
    /// # Errors
    ///
    /// Refuses with [`HubError::Validation`] to overwrite unsaved edits
    /// unless `force` is set; otherwise fails like [`Session::verify`] or
    /// with [`HubError::Remote`] at the fetch stage.
    pub async fn pull(&mut self, ctx: &ServiceContext, force: bool) -> Result<()> {
        if self.engine.is_dirty() && !force {
            return Err(HubError::Validation(
                "the draft has unsaved changes; run `linkhub save` or `linkhub pull --force`"
                    .into(),
            ));
        }
        let user_id = self.verify(ctx).await?;
        let profile = ctx
            .store
            .fetch_profile(&user_id)
            .await
            .map_err(|e| HubError::remote(RemoteStage::Fetch, &e))?;
        let links = ctx
            .store
            .fetch_links(&user_id)
            .await
            .map_err(|e| HubError::remote(RemoteStage::Fetch, &e))?;
        self.engine.load(profile, links);
        Ok(())
    }

    /// Runs the draft's sync plan for the signed-in user.
    ///
    /// # Errors
    ///
    /// Fails like [`Session::verify`] or [`DraftEngine::begin_save`]. Stage
    /// failures are carried in the returned report.
    pub async fn save(&mut self, ctx: &ServiceContext) -> Result<SyncReport> {
        let user_id = self.verify(ctx).await?;
        self.engine.save(ctx, &user_id).await
    }
}

/// Reads and writes a [`Session`] as YAML through the filesystem port.
pub struct SessionStore<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> SessionStore<'a> {
    /// Creates a store for the session file at `path`.
    pub fn new(fs: &'a dyn FileSystem, path: impl Into<PathBuf>) -> Self {
        Self { fs, path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the session, or an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Session`] if the file is unreadable or malformed.
    pub fn load(&self) -> Result<Session> {
        if !self.fs.exists(&self.path) {
            debug!(path = %self.path.display(), "no session file");
            return Ok(Session::default());
        }
        let yaml = self.fs.read_to_string(&self.path).map_err(|e| self.error("read", &*e))?;
        serde_yaml::from_str(&yaml).map_err(|e| self.error("parse", &e))
    }

    /// Writes the session.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Session`] if the file cannot be written.
    pub fn save(&self, session: &Session) -> Result<()> {
        let yaml = serde_yaml::to_string(session).map_err(|e| self.error("serialize", &e))?;
        self.fs.write(&self.path, &yaml).map_err(|e| self.error("write", &*e))
    }

    /// Deletes the session file.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Session`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        self.fs.remove(&self.path).map_err(|e| self.error("remove", &*e))
    }

    fn error(&self, action: &str, err: &dyn std::error::Error) -> HubError {
        HubError::Session(format!("failed to {action} {}: {err}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryBackend, MemoryFileSystem};
    use crate::draft::DraftState;
    use crate::model::Link;

    fn setup() -> (MemoryBackend, UserId, ServiceContext) {
        let backend = MemoryBackend::new();
        let user = backend.seed_user("ada@example.com", "pw", "ada");
        let ctx = ServiceContext::in_memory(&backend, MemoryFileSystem::new());
        (backend, user, ctx)
    }

    #[tokio::test]
    async fn login_then_pull_loads_the_draft() {
        let (_backend, user, ctx) = setup();
        let mut session = Session::default();
        assert!(matches!(session.user_id(), Err(HubError::Unauthenticated)));

        session.login(&ctx, "ada@example.com", "pw").await.unwrap();
        assert_eq!(session.user_id().unwrap(), &user);

        session.pull(&ctx, false).await.unwrap();
        assert_eq!(session.engine.state(), DraftState::Loaded);
        assert_eq!(session.engine.draft().profile.username, "ada");
    }

    #[tokio::test]
    async fn bad_credentials_are_an_auth_failure() {
        let (_backend, _user, ctx) = setup();
        let mut session = Session::default();
        let err = session.login(&ctx, "ada@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, HubError::Remote { stage: RemoteStage::Auth, .. }));
        assert!(session.auth.is_none());
    }

    #[tokio::test]
    async fn pull_refuses_to_discard_edits_unless_forced() {
        let (_backend, _user, ctx) = setup();
        let mut session = Session::default();
        session.login(&ctx, "ada@example.com", "pw").await.unwrap();
        session.pull(&ctx, false).await.unwrap();
        session.engine.add_link(Link::new("x", "X", "x.com").unwrap()).unwrap();

        assert!(matches!(session.pull(&ctx, false).await, Err(HubError::Validation(_))));
        assert!(session.engine.is_dirty());

        session.pull(&ctx, true).await.unwrap();
        assert!(!session.engine.is_dirty());
        assert!(session.engine.draft().links.is_empty());
    }

    #[tokio::test]
    async fn stale_token_means_unauthenticated() {
        let (_backend, user, ctx) = setup();
        let mut session = Session::default();
        session.sign_in(AuthSession::new(user, "ada@example.com", "expired"));
        assert!(matches!(session.pull(&ctx, false).await, Err(HubError::Unauthenticated)));
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_once() {
        let (backend, user, ctx) = setup();
        let mut session = Session::default();
        session.login(&ctx, "ada@example.com", "pw").await.unwrap();
        let before = session.auth.clone().unwrap();
        backend.expire_access_tokens();
        backend.clear_calls();

        session.pull(&ctx, false).await.unwrap();
        let after = session.auth.clone().unwrap();
        assert_eq!(after.user_id, user);
        assert_eq!(after.email, "ada@example.com");
        assert_ne!(after.access_token, before.access_token);
        assert_eq!(
            &backend.calls()[..3],
            ["current_user_id", "refresh", "current_user_id"].map(String::from)
        );

        backend.expire_access_tokens();
        session.auth = Some(AuthSession { refresh_token: before.refresh_token, ..after });
        assert!(matches!(session.pull(&ctx, false).await, Err(HubError::Unauthenticated)));
    }

    #[tokio::test]
    async fn expired_token_refreshes_before_the_check() {
        let (backend, _user, ctx) = setup();
        let mut session = Session::default();
        session.login(&ctx, "ada@example.com", "pw").await.unwrap();
        let auth = session.auth.as_mut().unwrap();
        auth.expires_at = Some(ctx.clock.now() - chrono::TimeDelta::minutes(1));
        backend.clear_calls();

        session.verify(&ctx).await.unwrap();
        assert_eq!(&backend.calls()[..2], ["refresh", "current_user_id"].map(String::from));
    }

    #[tokio::test]
    async fn sign_up_creates_a_welcome_profile() {
        let (backend, _user, ctx) = setup();
        let mut session = Session::default();

        let taken = session.sign_up(&ctx, "eve@example.com", "pw", "ada").await.unwrap_err();
        assert!(matches!(taken, HubError::Validation(_)));
        let invalid = session.sign_up(&ctx, "eve@example.com", "pw", "a b").await.unwrap_err();
        assert!(matches!(invalid, HubError::Validation(_)));

        let SignUpOutcome::Ready(profile) =
            session.sign_up(&ctx, "eve@example.com", "pw", "eve").await.unwrap()
        else {
            panic!("expected a session");
        };
        assert_eq!(profile.display_name, "eve");
        let user = session.user_id().unwrap().clone();
        assert_eq!(backend.profile_of(&user), Some(profile));
        assert_eq!(session.engine.state(), DraftState::Loaded);
    }

    #[tokio::test]
    async fn unconfirmed_sign_up_creates_the_profile_on_first_login() {
        let (backend, _user, ctx) = setup();
        backend.require_email_confirmation();
        let mut session = Session::default();

        let outcome = session.sign_up(&ctx, "eve@example.com", "pw", "eve").await.unwrap();
        assert_eq!(
            outcome,
            SignUpOutcome::AwaitingConfirmation {
                email: "eve@example.com".into(),
                username: "eve".into(),
            }
        );
        assert!(session.auth.is_none());
        let pending = session.pending_profile.clone().unwrap();
        assert_eq!(backend.profile_of(&pending.user_id), None);

        assert!(session.login(&ctx, "eve@example.com", "pw").await.is_err());
        assert!(session.pending_profile.is_some());

        backend.confirm_email("eve@example.com");
        session.login(&ctx, "eve@example.com", "pw").await.unwrap();
        assert!(session.pending_profile.is_none());
        assert_eq!(session.user_id().unwrap(), &pending.user_id);

        session.pull(&ctx, false).await.unwrap();
        assert_eq!(session.engine.draft().profile.username, "eve");
    }

    #[tokio::test]
    async fn failed_profile_insert_is_retried_on_login() {
        let (backend, _user, ctx) = setup();
        let mut session = Session::default();
        backend.fail("insert_profile", "connection reset");

        let err = session.sign_up(&ctx, "eve@example.com", "pw", "eve").await.unwrap_err();
        assert!(matches!(err, HubError::Remote { stage: RemoteStage::ProfileUpsert, .. }));
        assert!(session.pending_profile.is_some());

        backend.recover("insert_profile");
        session.login(&ctx, "eve@example.com", "pw").await.unwrap();
        assert!(session.pending_profile.is_none());
        let user = session.user_id().unwrap().clone();
        assert_eq!(backend.profile_of(&user).unwrap().username, "eve");
    }

    #[tokio::test]
    async fn pending_profile_waits_for_its_own_account() {
        let (backend, _user, ctx) = setup();
        backend.require_email_confirmation();
        let mut session = Session::default();
        session.sign_up(&ctx, "eve@example.com", "pw", "eve").await.unwrap();

        session.login(&ctx, "ada@example.com", "pw").await.unwrap();
        assert!(session.pending_profile.is_some());
        assert!(!backend.calls().contains(&"insert_profile".to_string()));
    }

    #[test]
    fn switching_users_resets_the_draft() {
        let mut session = Session::default();
        let auth = |id: &str| AuthSession::new(UserId::from(id), &format!("{id}@example.com"), "t");
        session.sign_in(auth("u1"));
        session.engine.load(Profile::for_new_user("ada").unwrap(), Vec::new());

        session.sign_in(auth("u1"));
        assert_eq!(session.engine.state(), DraftState::Loaded);
        session.sign_in(auth("u2"));
        assert_eq!(session.engine.state(), DraftState::Empty);
    }

    #[test]
    fn store_round_trips_without_the_saving_marker() {
        let fs = MemoryFileSystem::new();
        let store = SessionStore::new(&fs, "/home/.linkhub/session.yaml");
        assert_eq!(store.load().unwrap(), Session::default());

        let mut session = Session::default();
        session.engine.load(Profile::for_new_user("ada").unwrap(), Vec::new());
        session.engine.add_link(Link::new("a", "A", "a.com").unwrap()).unwrap();
        session.engine.begin_save().unwrap();
        store.save(&session).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.engine.state(), DraftState::Dirty);
        assert_eq!(loaded.engine.draft(), session.engine.draft());

        store.clear().unwrap();
        assert!(!fs.exists(store.path()));
    }

    #[test]
    fn malformed_session_file_is_a_session_error() {
        let fs = MemoryFileSystem::new();
        fs.insert("/s.yaml", "engine: [not, a, map]");
        let err = SessionStore::new(&fs, "/s.yaml").load().unwrap_err();
        assert!(matches!(err, HubError::Session(_)));
    }
}
