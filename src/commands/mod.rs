//! Command dispatch and handlers.
//!
//! Every command loads the session file, runs against a [`ServiceContext`]
//! and writes the session back, so draft edits survive between invocations.

pub mod account;
pub mod link;
pub mod profile;
pub mod pull;
pub mod save;
pub mod show;
pub mod status;

use std::path::{Path, PathBuf};

use crate::cli::Command;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::{HubError, Result};
use crate::session::{Session, SessionStore};

impl Command {
    /// Short name used for cassette files.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Signup { .. } => "signup",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Pull { .. } => "pull",
            Self::Status => "status",
            Self::Profile(_) => "profile",
            Self::Link(_) => "link",
            Self::Save => "save",
            Self::Show { .. } => "show",
        }
    }

    /// Whether the command cannot work without a backend.
    #[must_use]
    pub fn needs_backend(&self) -> bool {
        matches!(
            self,
            Self::Signup { .. }
                | Self::Login { .. }
                | Self::Pull { .. }
                | Self::Save
                | Self::Show { .. }
        )
    }
}

/// Dispatch a parsed command to its handler.
///
/// When `LINKHUB_RECORD` names a directory, remote interactions are recorded
/// to a cassette file there.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command, config: &Config) -> std::result::Result<(), String> {
    let ctx = build_context(command, config).map_err(|e| e.to_string())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    runtime
        .block_on(dispatch_with_context(command, &ctx, &config.session_path()))
        .map_err(|e| e.to_string())
}

fn build_context(command: &Command, config: &Config) -> Result<ServiceContext> {
    let backend = match config.backend() {
        Ok(backend) => backend,
        Err(e) if command.needs_backend() => return Err(e),
        Err(_) => return Ok(ServiceContext::local()),
    };
    Ok(match &config.record_dir {
        Some(dir) => ServiceContext::recording(
            backend,
            &cassette_path(dir, command.name()),
            &format!("linkhub {}", command.name()),
        ),
        None => ServiceContext::live(backend),
    })
}

fn cassette_path(dir: &Path, name: &str) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f");
    dir.join(format!("{name}-{stamp}.cassette.yaml"))
}

/// Dispatch a command with the given service context and session file.
///
/// # Errors
///
/// Returns the handler's error, or a session error if the session file
/// cannot be read or written.
pub async fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    session_path: &Path,
) -> Result<()> {
    let store = SessionStore::new(ctx.fs.as_ref(), session_path);
    let mut session = store.load()?;
    ctx.set_access_token(session.access_token());

    let result = match command {
        Command::Signup { email, password, username } => {
            account::signup(ctx, &mut session, email, password, username).await
        }
        Command::Login { email, password } => {
            account::login(ctx, &mut session, email, password).await
        }
        Command::Logout => {
            account::logout(&session);
            return store.clear();
        }
        Command::Pull { force } => pull::run(ctx, &mut session, *force).await,
        Command::Status => return status::run(&session),
        Command::Profile(args) => profile::run(ctx, &mut session, args),
        Command::Link(link_command) => link::run(ctx, &mut session, link_command),
        Command::Save => save::run(ctx, &mut session).await,
        Command::Show { username } => return show::run(ctx, username).await,
    };

    // Persist even after a failure: a partial save still moves the baseline.
    store.save(&session)?;
    result
}

/// Fails unless the draft has been loaded from the backend.
fn ensure_loaded(session: &Session) -> Result<()> {
    session.user_id()?;
    if session.engine.baseline().is_none() {
        return Err(HubError::NotLoaded);
    }
    Ok(())
}
