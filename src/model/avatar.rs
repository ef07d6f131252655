//! Avatar values: either a remote URL or a data URL waiting to be uploaded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

const DATA_IMAGE_PREFIX: &str = "data:image";

/// Profile picture reference.
///
/// Serialized as a bare string; the variant is recovered from the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Avatar {
    /// Already stored remotely.
    Remote(String),
    /// `data:image/...;base64,...` URL not yet uploaded.
    Pending(String),
}

impl Avatar {
    /// Classifies a stored avatar string.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::from(value.to_string())
    }

    /// Encodes raw image bytes as a pending avatar.
    #[must_use]
    pub fn from_image(image: &AvatarImage) -> Self {
        Self::Pending(format!(
            "data:{};base64,{}",
            image.content_type,
            STANDARD.encode(&image.bytes)
        ))
    }

    /// The underlying URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(url) | Self::Pending(url) => url,
        }
    }

    /// Returns `true` when the image still has to be uploaded.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Decodes a pending data URL into raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the avatar is remote or the data URL
    /// is not base64-encoded image data.
    pub fn decode(&self) -> Result<AvatarImage> {
        let Self::Pending(data_url) = self else {
            return Err(HubError::Validation("avatar is already a remote URL".into()));
        };
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| HubError::Validation("avatar is not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| HubError::Validation("avatar data URL has no payload".into()))?;
        let content_type = header.strip_suffix(";base64").ok_or_else(|| {
            HubError::Validation("avatar data URL is not base64-encoded".into())
        })?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| HubError::Validation(format!("avatar payload is not valid base64: {e}")))?;
        Ok(AvatarImage { content_type: content_type.to_string(), bytes })
    }
}

impl From<String> for Avatar {
    fn from(value: String) -> Self {
        if value.starts_with(DATA_IMAGE_PREFIX) {
            Self::Pending(value)
        } else {
            Self::Remote(value)
        }
    }
}

impl From<Avatar> for String {
    fn from(value: Avatar) -> Self {
        match value {
            Avatar::Remote(url) | Avatar::Pending(url) => url,
        }
    }
}

/// Decoded image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarImage {
    /// MIME type such as `image/jpeg`.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl AvatarImage {
    /// Guesses the MIME type from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for extensions that are not images.
    pub fn from_file_bytes(extension: &str, bytes: Vec<u8>) -> Result<Self> {
        let content_type = match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                return Err(HubError::Validation(format!(
                    "unsupported avatar file type {other:?}"
                )))
            }
        };
        Ok(Self { content_type: content_type.to_string(), bytes })
    }

    /// File extension used for the stored object.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        }
    }
}
