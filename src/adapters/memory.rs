//! In-process adapters: a fake backend plus local stand-ins for files,
//! ids and time.
//!
//! [`MemoryBackend`] plays the auth service, the profile/link tables and
//! avatar storage at once. Clones share state, so a test can keep a handle
//! for inspection while the context owns another. Any method can be made to
//! fail with [`MemoryBackend::fail`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::error::PortError;
use crate::model::{AvatarImage, Link, LinkId, PositionedLink, Profile, UserId};
use crate::ports::{
    AuthSession, Authenticator, AvatarStore, Clock, FileSystem, IdGenerator, PortFuture,
    ProfileStore, SignUp,
};

fn ready<'a, T: Send + 'a>(result: Result<T, PortError>) -> PortFuture<'a, T> {
    Box::pin(std::future::ready(result))
}

struct Account {
    user_id: UserId,
    password: String,
    confirmed: bool,
}

struct StoredLink {
    owner: UserId,
    link: Link,
    position: usize,
    created: u64,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct BackendState {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, UserId>,
    refresh_tokens: HashMap<String, (UserId, String)>,
    confirm_emails: bool,
    profiles: HashMap<UserId, Profile>,
    profile_updates: HashMap<UserId, DateTime<Utc>>,
    links: Vec<StoredLink>,
    avatars: HashMap<String, AvatarImage>,
    failures: HashMap<String, String>,
    calls: Vec<String>,
    counter: u64,
}

impl BackendState {
    fn next(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    /// Logs the call and returns the injected failure, if any.
    fn enter(&mut self, method: &str) -> Result<(), PortError> {
        self.calls.push(method.to_string());
        match self.failures.get(method) {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }

    fn issue_session(&mut self, user_id: UserId, email: &str) -> AuthSession {
        let access_token = format!("memory-token-{}", self.next());
        let refresh_token = format!("memory-refresh-{}", self.next());
        self.tokens.insert(access_token.clone(), user_id.clone());
        self.refresh_tokens.insert(refresh_token.clone(), (user_id.clone(), email.to_string()));
        AuthSession { refresh_token, ..AuthSession::new(user_id, email, &access_token) }
    }
}

/// Shared in-memory stand-in for the hosted backend.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an account with a freshly created profile and returns its id.
    pub fn seed_user(&self, email: &str, password: &str, username: &str) -> UserId {
        let mut state = self.state();
        let user_id = UserId::from(format!("user-{}", state.next()));
        state.accounts.insert(
            email.to_string(),
            Account { user_id: user_id.clone(), password: password.to_string(), confirmed: true },
        );
        let profile = Profile {
            username: username.to_string(),
            display_name: username.to_string(),
            description: crate::model::profile::WELCOME_DESCRIPTION.to_string(),
            ..Profile::default()
        };
        state.profiles.insert(user_id.clone(), profile);
        user_id
    }

    /// Makes later sign-ups wait for [`MemoryBackend::confirm_email`]
    /// before issuing a session.
    pub fn require_email_confirmation(&self) {
        self.state().confirm_emails = true;
    }

    /// Confirms the account registered with `email`.
    pub fn confirm_email(&self, email: &str) {
        if let Some(account) = self.state().accounts.get_mut(email) {
            account.confirmed = true;
        }
    }

    /// Invalidates every access token issued so far; refresh tokens keep working.
    pub fn expire_access_tokens(&self) {
        self.state().tokens.clear();
    }

    /// Makes every later call to `method` fail with `message`.
    pub fn fail(&self, method: &str, message: &str) {
        self.state().failures.insert(method.to_string(), message.to_string());
    }

    /// Clears a failure injected with [`MemoryBackend::fail`].
    pub fn recover(&self, method: &str) {
        self.state().failures.remove(method);
    }

    /// Method names called so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Forgets the call log.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Stored profile of `user_id`.
    #[must_use]
    pub fn profile_of(&self, user_id: &UserId) -> Option<Profile> {
        self.state().profiles.get(user_id).cloned()
    }

    /// Stored links of `user_id` in display order.
    #[must_use]
    pub fn links_of(&self, user_id: &UserId) -> Vec<Link> {
        sorted_links(&self.state(), user_id)
    }

    /// Stored position of a link.
    #[must_use]
    pub fn position_of(&self, id: &LinkId) -> Option<usize> {
        self.state().links.iter().find(|s| &s.link.id == id).map(|s| s.position)
    }

    /// `updated_at` last written for a link.
    #[must_use]
    pub fn link_updated_at(&self, id: &LinkId) -> Option<DateTime<Utc>> {
        self.state().links.iter().find(|s| &s.link.id == id).and_then(|s| s.updated_at)
    }

    /// `updated_at` last written for a profile.
    #[must_use]
    pub fn profile_updated_at(&self, user_id: &UserId) -> Option<DateTime<Utc>> {
        self.state().profile_updates.get(user_id).copied()
    }

    /// Number of stored avatar objects.
    #[must_use]
    pub fn avatar_count(&self) -> usize {
        self.state().avatars.len()
    }
}

fn sorted_links(state: &BackendState, user_id: &UserId) -> Vec<Link> {
    let mut owned: Vec<&StoredLink> = state.links.iter().filter(|s| &s.owner == user_id).collect();
    owned.sort_by_key(|s| (s.position, s.created));
    owned.into_iter().map(|s| s.link.clone()).collect()
}

impl Authenticator for MemoryBackend {
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> PortFuture<'a, AuthSession> {
        let mut state = self.state();
        let result = state.enter("sign_in").and_then(|()| {
            let account = state
                .accounts
                .get(email)
                .filter(|a| a.password == password)
                .ok_or_else(|| -> PortError { "Invalid login credentials".into() })?;
            if !account.confirmed {
                return Err("Email not confirmed".into());
            }
            let user_id = account.user_id.clone();
            Ok(state.issue_session(user_id, email))
        });
        ready(result)
    }

    fn sign_up<'a>(&'a self, email: &'a str, password: &'a str) -> PortFuture<'a, SignUp> {
        let mut state = self.state();
        let result = state.enter("sign_up").and_then(|()| {
            if state.accounts.contains_key(email) {
                return Err("User already registered".into());
            }
            let user_id = UserId::from(format!("user-{}", state.next()));
            let confirmed = !state.confirm_emails;
            state.accounts.insert(
                email.to_string(),
                Account { user_id: user_id.clone(), password: password.to_string(), confirmed },
            );
            let session = confirmed.then(|| state.issue_session(user_id.clone(), email));
            Ok(SignUp { user_id, email: email.to_string(), session })
        });
        ready(result)
    }

    fn refresh<'a>(&'a self, refresh_token: &'a str) -> PortFuture<'a, AuthSession> {
        let mut state = self.state();
        let result = state.enter("refresh").and_then(|()| {
            let (user_id, email) = state
                .refresh_tokens
                .remove(refresh_token)
                .ok_or_else(|| -> PortError { "Invalid Refresh Token: Refresh Token Not Found".into() })?;
            Ok(state.issue_session(user_id, &email))
        });
        ready(result)
    }

    fn current_user_id<'a>(&'a self, access_token: &'a str) -> PortFuture<'a, Option<UserId>> {
        let mut state = self.state();
        let result =
            state.enter("current_user_id").map(|()| state.tokens.get(access_token).cloned());
        ready(result)
    }
}

impl ProfileStore for MemoryBackend {
    fn fetch_profile<'a>(&'a self, user_id: &'a UserId) -> PortFuture<'a, Profile> {
        let mut state = self.state();
        let result = state.enter("fetch_profile").and_then(|()| {
            state
                .profiles
                .get(user_id)
                .cloned()
                .ok_or_else(|| format!("profile not found for user {user_id}").into())
        });
        ready(result)
    }

    fn fetch_profile_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> PortFuture<'a, Option<(UserId, Profile)>> {
        let mut state = self.state();
        let result = state.enter("fetch_profile_by_username").map(|()| {
            state
                .profiles
                .iter()
                .find(|(_, p)| p.username == username)
                .map(|(id, p)| (id.clone(), p.clone()))
        });
        ready(result)
    }

    fn fetch_links<'a>(&'a self, user_id: &'a UserId) -> PortFuture<'a, Vec<Link>> {
        let mut state = self.state();
        let result = state.enter("fetch_links").map(|()| sorted_links(&state, user_id));
        ready(result)
    }

    fn insert_profile<'a>(
        &'a self,
        user_id: &'a UserId,
        profile: &'a Profile,
    ) -> PortFuture<'a, ()> {
        let mut state = self.state();
        let result = state.enter("insert_profile").and_then(|()| {
            if state.profiles.contains_key(user_id) {
                return Err(format!("profile for user {user_id} already exists").into());
            }
            if state.profiles.values().any(|p| p.username == profile.username) {
                return Err(format!("username {} is already taken", profile.username).into());
            }
            state.profiles.insert(user_id.clone(), profile.clone());
            Ok(())
        });
        ready(result)
    }

    fn upsert_profile<'a>(
        &'a self,
        user_id: &'a UserId,
        profile: &'a Profile,
        updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        let mut state = self.state();
        let result = state.enter("upsert_profile").map(|()| {
            let stored = state.profiles.entry(user_id.clone()).or_insert_with(|| profile.clone());
            let username = std::mem::take(&mut stored.username);
            *stored = Profile { username, ..profile.clone() };
            state.profile_updates.insert(user_id.clone(), updated_at);
        });
        ready(result)
    }

    fn upsert_links<'a>(
        &'a self,
        user_id: &'a UserId,
        links: &'a [PositionedLink],
        updated_at: DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        let mut state = self.state();
        let result = state.enter("upsert_links").map(|()| {
            for positioned in links {
                match state.links.iter().position(|s| s.link.id == positioned.link.id) {
                    Some(index) => {
                        let stored = &mut state.links[index];
                        stored.link = positioned.link.clone();
                        stored.position = positioned.position;
                        stored.updated_at = Some(updated_at);
                    }
                    None => {
                        let created = state.next();
                        state.links.push(StoredLink {
                            owner: user_id.clone(),
                            link: positioned.link.clone(),
                            position: positioned.position,
                            created,
                            updated_at: Some(updated_at),
                        });
                    }
                }
            }
        });
        ready(result)
    }

    fn delete_links<'a>(&'a self, ids: &'a [LinkId]) -> PortFuture<'a, ()> {
        let mut state = self.state();
        let result = state.enter("delete_links").map(|()| {
            state.links.retain(|s| !ids.contains(&s.link.id));
        });
        ready(result)
    }
}

impl AvatarStore for MemoryBackend {
    fn upload_avatar<'a>(
        &'a self,
        user_id: &'a UserId,
        image: &'a AvatarImage,
    ) -> PortFuture<'a, String> {
        let mut state = self.state();
        let result = state.enter("upload_avatar").map(|()| {
            let key = format!("{user_id}.{}", image.extension());
            state.avatars.insert(key.clone(), image.clone());
            format!("memory://avatars/{key}")
        });
        ready(result)
    }
}

/// Filesystem kept in a map, used when replaying and in tests.
#[derive(Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files().insert(path.into(), contents.into());
    }

    fn files(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self, path: &Path) -> Result<Vec<u8>, PortError> {
        self.files().get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}: no such file", path.display()))
                .into()
        })
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        Ok(String::from_utf8(self.get(path)?)?)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, PortError> {
        self.get(path)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        self.insert(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }

    fn remove(&self, path: &Path) -> Result<(), PortError> {
        self.files().remove(path);
        Ok(())
    }
}

/// Hands out `link-1`, `link-2`, ...
#[derive(Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> String {
        format!("link-{}", self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Clock frozen at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
