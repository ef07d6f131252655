//! Profile record, partial updates, and the theme enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Avatar;
use crate::error::{HubError, Result};

/// Description given to freshly created profiles.
pub const WELCOME_DESCRIPTION: &str = "Welcome to my profile!";

/// Color scheme of the public page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(HubError::Validation(format!(
                "unknown theme {other:?}; expected light or dark"
            ))),
        }
    }
}

/// Public-facing profile of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique routing key; never changes after creation.
    pub username: String,
    /// Name shown at the top of the page.
    pub display_name: String,
    /// Free-text bio.
    pub description: String,
    /// Remote URL or a pending local image.
    pub avatar: Option<Avatar>,
    /// Page color scheme.
    pub theme: Theme,
}

impl Profile {
    /// Builds the profile inserted when a user signs up.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the username is not a valid routing key.
    pub fn for_new_user(username: &str) -> Result<Self> {
        let username = validate_username(username)?;
        Ok(Self {
            display_name: username.clone(),
            username,
            description: WELCOME_DESCRIPTION.to_string(),
            avatar: None,
            theme: Theme::Light,
        })
    }

    /// Merges `patch` into this profile, leaving absent fields untouched.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
    }
}

/// Partial profile update. The username is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New avatar.
    pub avatar: Option<Avatar>,
    /// New theme.
    pub theme: Option<Theme>,
}

impl ProfilePatch {
    /// Returns `true` when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.description.is_none()
            && self.avatar.is_none()
            && self.theme.is_none()
    }
}

/// Checks that `username` can serve as a URL path segment.
///
/// # Errors
///
/// Returns [`HubError::Validation`] for blank names or names containing
/// anything other than ASCII letters, digits, `-` and `_`.
pub fn validate_username(username: &str) -> Result<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(HubError::Validation("username must not be empty".into()));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(HubError::Validation(format!(
            "username {trimmed:?} may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(trimmed.to_string())
}
