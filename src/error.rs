//! Error types for LinkHub.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::LinkId;

/// Boxed error returned by port implementations.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HubError>;

/// The remote interaction that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStage {
    /// Fetching the profile or links.
    Fetch,
    /// Sign-in, sign-up or session lookup.
    Auth,
    /// Uploading a pending avatar image.
    AvatarUpload,
    /// Persisting the profile record.
    ProfileUpsert,
    /// Deleting removed links.
    LinkDelete,
    /// Persisting the surviving links with their positions.
    LinkUpsert,
}

impl fmt::Display for RemoteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fetch => "fetch",
            Self::Auth => "auth",
            Self::AvatarUpload => "avatar upload",
            Self::ProfileUpsert => "profile upsert",
            Self::LinkDelete => "link delete",
            Self::LinkUpsert => "link upsert",
        };
        f.write_str(label)
    }
}

/// Main error type for LinkHub operations
#[derive(Error, Debug)]
pub enum HubError {
    /// Local input rejected (duplicate id, empty title, bad permutation, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// An edit referenced a link id that is not in the draft
    #[error("Link not found: {0}")]
    NotFound(LinkId),

    /// A save is already running for this draft
    #[error("A save is already in progress")]
    SaveInProgress,

    /// The draft has never been loaded from the backend
    #[error("Nothing loaded yet; run `linkhub pull` first")]
    NotLoaded,

    /// No signed-in user
    #[error("Not authenticated; run `linkhub login` first")]
    Unauthenticated,

    /// A collaborator call failed
    #[error("Remote {stage} failed: {message}")]
    Remote {
        /// Which interaction failed.
        stage: RemoteStage,
        /// The collaborator's error message.
        message: String,
    },

    /// Session file could not be read, parsed or written
    #[error("Session error: {0}")]
    Session(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HubError {
    /// Wraps a port error as a remote failure at the given stage.
    #[must_use]
    pub fn remote(stage: RemoteStage, err: &PortError) -> Self {
        Self::Remote { stage, message: err.to_string() }
    }

    /// Returns `true` for failures worth retrying unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::SaveInProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_names_the_stage() {
        let err: PortError = "connection reset".into();
        let hub = HubError::remote(RemoteStage::LinkDelete, &err);
        assert_eq!(hub.to_string(), "Remote link delete failed: connection reset");
        assert!(hub.is_retryable());
    }

    #[test]
    fn local_errors_are_not_retryable() {
        assert!(!HubError::Validation("dup".into()).is_retryable());
        assert!(!HubError::NotFound(LinkId::from("a")).is_retryable());
    }
}
