//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, warn};

use crate::adapters::live::{
    BackendClient, LiveAuthenticator, LiveAvatarStore, LiveClock, LiveFileSystem,
    LiveIdGenerator, LiveProfileStore,
};
use crate::adapters::memory::{
    FixedClock, MemoryBackend, MemoryFileSystem, SequentialIdGenerator,
};
use crate::adapters::recording::{
    RecordingAuthenticator, RecordingAvatarStore, RecordingClock, RecordingIdGenerator,
    RecordingProfileStore, SharedRecorder,
};
use crate::adapters::replaying::{
    ReplayingAuthenticator, ReplayingAvatarStore, ReplayingClock, ReplayingIdGenerator,
    ReplayingProfileStore, SharedReplayer,
};
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::BackendConfig;
use crate::error::PortError;
use crate::model::{AvatarImage, Link, LinkId, PositionedLink, Profile, UserId};
use crate::ports::{
    AuthSession, Authenticator, AvatarStore, Clock, FileSystem, IdGenerator, PortFuture,
    ProfileStore, SignUp,
};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, recording, replaying,
/// in-memory).
pub struct ServiceContext {
    /// Clock stamping `updated_at`.
    pub clock: Box<dyn Clock>,
    /// Filesystem holding the session file.
    pub fs: Box<dyn FileSystem>,
    /// Generator for new link ids.
    pub id_gen: Box<dyn IdGenerator>,
    /// Sign-in and session checks.
    pub auth: Box<dyn Authenticator>,
    /// Profile and link tables.
    pub store: Box<dyn ProfileStore>,
    /// Avatar object storage.
    pub avatars: Box<dyn AvatarStore>,
    /// Client shared by the live adapters, when there are any.
    client: Option<BackendClient>,
    /// Optional cassette recorder; written to disk on drop.
    recorder: Option<SharedRecorder>,
}

impl ServiceContext {
    /// Creates a live context talking to the configured backend.
    #[must_use]
    pub fn live(backend: BackendConfig) -> Self {
        let client = BackendClient::new(backend);
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
            auth: Box::new(LiveAuthenticator::new(client.clone())),
            store: Box::new(LiveProfileStore::new(client.clone())),
            avatars: Box::new(LiveAvatarStore::new(client.clone())),
            client: Some(client),
            recorder: None,
        }
    }

    /// Creates a live context that also records every remote interaction.
    ///
    /// The cassette is written to `path` when this context is dropped. The
    /// session file is read and written for real and is not recorded.
    #[must_use]
    pub fn recording(backend: BackendConfig, path: &Path, name: &str) -> Self {
        let recorder: SharedRecorder = Arc::new(Mutex::new(CassetteRecorder::new(path, name)));
        let client = BackendClient::new(backend);
        let rec = || Arc::clone(&recorder);
        Self {
            clock: Box::new(RecordingClock::new(Box::new(LiveClock), rec())),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(RecordingIdGenerator::new(Box::new(LiveIdGenerator), rec())),
            auth: Box::new(RecordingAuthenticator::new(
                Box::new(LiveAuthenticator::new(client.clone())),
                rec(),
            )),
            store: Box::new(RecordingProfileStore::new(
                Box::new(LiveProfileStore::new(client.clone())),
                rec(),
            )),
            avatars: Box::new(RecordingAvatarStore::new(
                Box::new(LiveAvatarStore::new(client.clone())),
                rec(),
            )),
            client: Some(client),
            recorder: Some(recorder),
        }
    }

    /// Creates a context for commands that never leave the machine.
    ///
    /// Remote ports answer with a configuration error instead of a request.
    #[must_use]
    pub fn local() -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
            auth: Box::new(Unconfigured),
            store: Box::new(Unconfigured),
            avatars: Box::new(Unconfigured),
            client: None,
            recorder: None,
        }
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// All remote ports are served by one replayer. Files live in memory, so
    /// a replay never touches the real session.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette = Cassette::from_yaml(&content)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        Ok(Self::replaying_cassette(&cassette, MemoryFileSystem::new()))
    }

    /// Creates a replaying context from an already loaded cassette.
    #[must_use]
    pub fn replaying_cassette(cassette: &Cassette, fs: MemoryFileSystem) -> Self {
        let replayer: SharedReplayer = Arc::new(Mutex::new(CassetteReplayer::new(cassette)));
        Self {
            clock: Box::new(ReplayingClock::new(Arc::clone(&replayer))),
            fs: Box::new(fs),
            id_gen: Box::new(ReplayingIdGenerator::new(Arc::clone(&replayer))),
            auth: Box::new(ReplayingAuthenticator::new(Arc::clone(&replayer))),
            store: Box::new(ReplayingProfileStore::new(Arc::clone(&replayer))),
            avatars: Box::new(ReplayingAvatarStore::new(replayer)),
            client: None,
            recorder: None,
        }
    }

    /// Creates a context backed entirely by `backend` and in-memory files.
    ///
    /// Ids come out as `link-1`, `link-2`, ... and the clock is frozen at
    /// the moment of creation.
    #[must_use]
    pub fn in_memory(backend: &MemoryBackend, fs: MemoryFileSystem) -> Self {
        Self {
            clock: Box::new(FixedClock(Utc::now())),
            fs: Box::new(fs),
            id_gen: Box::new(SequentialIdGenerator::default()),
            auth: Box::new(backend.clone()),
            store: Box::new(backend.clone()),
            avatars: Box::new(backend.clone()),
            client: None,
            recorder: None,
        }
    }

    /// Hands the signed-in user's token to the live adapters.
    ///
    /// Other adapters carry no credentials, so this is a no-op for them.
    pub fn set_access_token(&self, token: Option<&str>) {
        if let Some(client) = &self.client {
            client.set_access_token(token);
        }
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let Ok(recorder) = recorder.lock() else {
            warn!("cassette recorder poisoned; nothing written");
            return;
        };
        match recorder.write() {
            Ok(path) => {
                debug!(path = %path.display(), interactions = recorder.len(), "cassette written");
            }
            Err(e) => {
                warn!(path = %recorder.path().display(), error = %e, "failed to write cassette");
            }
        }
    }
}

/// Stand-in for the remote ports when no backend is configured.
struct Unconfigured;

impl Unconfigured {
    fn err<'a, T: Send + 'a>() -> PortFuture<'a, T> {
        Box::pin(std::future::ready(Err::<T, PortError>(
            "no backend configured; set LINKHUB_URL and LINKHUB_ANON_KEY".into(),
        )))
    }
}

impl Authenticator for Unconfigured {
    fn sign_in<'a>(&'a self, _email: &'a str, _password: &'a str) -> PortFuture<'a, AuthSession> {
        Self::err()
    }

    fn sign_up<'a>(&'a self, _email: &'a str, _password: &'a str) -> PortFuture<'a, SignUp> {
        Self::err()
    }

    fn refresh<'a>(&'a self, _refresh_token: &'a str) -> PortFuture<'a, AuthSession> {
        Self::err()
    }

    fn current_user_id<'a>(&'a self, _access_token: &'a str) -> PortFuture<'a, Option<UserId>> {
        Self::err()
    }
}

impl ProfileStore for Unconfigured {
    fn fetch_profile<'a>(&'a self, _user_id: &'a UserId) -> PortFuture<'a, Profile> {
        Self::err()
    }

    fn fetch_profile_by_username<'a>(
        &'a self,
        _username: &'a str,
    ) -> PortFuture<'a, Option<(UserId, Profile)>> {
        Self::err()
    }

    fn fetch_links<'a>(&'a self, _user_id: &'a UserId) -> PortFuture<'a, Vec<Link>> {
        Self::err()
    }

    fn insert_profile<'a>(
        &'a self,
        _user_id: &'a UserId,
        _profile: &'a Profile,
    ) -> PortFuture<'a, ()> {
        Self::err()
    }

    fn upsert_profile<'a>(
        &'a self,
        _user_id: &'a UserId,
        _profile: &'a Profile,
        _updated_at: chrono::DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        Self::err()
    }

    fn upsert_links<'a>(
        &'a self,
        _user_id: &'a UserId,
        _links: &'a [PositionedLink],
        _updated_at: chrono::DateTime<Utc>,
    ) -> PortFuture<'a, ()> {
        Self::err()
    }

    fn delete_links<'a>(&'a self, _ids: &'a [LinkId]) -> PortFuture<'a, ()> {
        Self::err()
    }
}

impl AvatarStore for Unconfigured {
    fn upload_avatar<'a>(
        &'a self,
        _user_id: &'a UserId,
        _image: &'a AvatarImage,
    ) -> PortFuture<'a, String> {
        Self::err()
    }
}
