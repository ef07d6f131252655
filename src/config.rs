//! Environment-driven configuration.
//!
//! Values come from the process environment, after loading a `.env` file
//! from the working directory when one exists.

use std::env;
use std::path::PathBuf;

use crate::error::{HubError, Result};

/// Default storage bucket for avatars.
pub const DEFAULT_AVATAR_BUCKET: &str = "avatars";
/// Default directory for the session file.
pub const DEFAULT_HOME: &str = ".linkhub";
/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL, without trailing slash.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Storage bucket holding avatars.
    pub avatar_bucket: String,
}

/// Runtime configuration of the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    url: Option<String>,
    anon_key: Option<String>,
    avatar_bucket: String,
    /// Directory holding `session.yaml`.
    pub home: PathBuf,
    /// When set, remote interactions are recorded to a cassette in this directory.
    pub record_dir: Option<PathBuf>,
    /// Tracing filter directive.
    pub log_filter: String,
}

impl Config {
    /// Loads `.env` (if present) and reads configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        // A missing .env file is the normal case outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            url: non_empty("LINKHUB_URL").map(|u| u.trim().trim_end_matches('/').to_string()),
            anon_key: non_empty("LINKHUB_ANON_KEY"),
            avatar_bucket: non_empty("LINKHUB_AVATAR_BUCKET")
                .unwrap_or_else(|| DEFAULT_AVATAR_BUCKET.to_string()),
            home: non_empty("LINKHUB_HOME").map_or_else(|| PathBuf::from(DEFAULT_HOME), PathBuf::from),
            record_dir: non_empty("LINKHUB_RECORD").map(PathBuf::from),
            log_filter: non_empty("LINKHUB_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Backend settings, if both URL and key are present.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Config`] naming the missing variables.
    pub fn backend(&self) -> Result<BackendConfig> {
        match (&self.url, &self.anon_key) {
            (Some(url), Some(anon_key)) => Ok(BackendConfig {
                url: url.clone(),
                anon_key: anon_key.clone(),
                avatar_bucket: self.avatar_bucket.clone(),
            }),
            (None, None) => {
                Err(HubError::Config("LINKHUB_URL and LINKHUB_ANON_KEY are not set".into()))
            }
            (None, Some(_)) => Err(HubError::Config("LINKHUB_URL is not set".into())),
            (Some(_), None) => Err(HubError::Config("LINKHUB_ANON_KEY is not set".into())),
        }
    }

    /// Location of the persisted session.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.home.join("session.yaml")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.home, PathBuf::from(".linkhub"));
        assert_eq!(cfg.session_path(), PathBuf::from(".linkhub/session.yaml"));
        assert_eq!(cfg.log_filter, "warn");
        assert!(cfg.record_dir.is_none());
        assert!(matches!(cfg.backend(), Err(HubError::Config(_))));
    }

    #[test]
    fn backend_requires_url_and_key() {
        let cfg = config(&[("LINKHUB_URL", "https://db.example.com/")]);
        let err = cfg.backend().unwrap_err();
        assert!(err.to_string().contains("LINKHUB_ANON_KEY"));

        let cfg = config(&[
            ("LINKHUB_URL", "https://db.example.com/"),
            ("LINKHUB_ANON_KEY", "anon"),
            ("LINKHUB_AVATAR_BUCKET", "pics"),
        ]);
        let backend = cfg.backend().unwrap();
        assert_eq!(backend.url, "https://db.example.com");
        assert_eq!(backend.avatar_bucket, "pics");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("LINKHUB_HOME", "  "), ("LINKHUB_LOG", "")]);
        assert_eq!(cfg.home, PathBuf::from(".linkhub"));
        assert_eq!(cfg.log_filter, "warn");
    }
}
