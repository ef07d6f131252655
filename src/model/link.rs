//! Links and their positional form used when persisting.

use serde::{Deserialize, Serialize};

use super::LinkId;
use crate::error::{HubError, Result};

/// A single entry on a profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Stable identifier.
    pub id: LinkId,
    /// Display text.
    pub title: String,
    /// Target URL, always carrying a scheme.
    pub url: String,
    /// Inactive links are kept but hidden from the public page.
    pub active: bool,
}

impl Link {
    /// Builds an active link, trimming the title and normalizing the URL.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the title or URL is blank.
    pub fn new(id: impl Into<LinkId>, title: &str, url: &str) -> Result<Self> {
        let link = Self {
            id: id.into(),
            title: title.trim().to_string(),
            url: normalize_url(url),
            active: true,
        };
        link.validate()?;
        Ok(link)
    }

    /// Checks the invariants a link must hold before it enters a draft.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the id, title or URL is blank.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(HubError::Validation("link id must not be empty".into()));
        }
        if self.title.trim().is_empty() {
            return Err(HubError::Validation(format!("link {} has an empty title", self.id)));
        }
        if self.url.trim().is_empty() || self.url == "https://" {
            return Err(HubError::Validation(format!("link {} has an empty URL", self.id)));
        }
        Ok(())
    }
}

/// Prefixes `https://` onto URLs that do not already start with `http`.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// A link tagged with its index in the draft, as sent to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedLink {
    /// The link itself.
    pub link: Link,
    /// Zero-based display position.
    pub position: usize,
}
