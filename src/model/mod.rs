//! Profile and link data types shared by the engine, ports and adapters.

pub mod avatar;
pub mod link;
pub mod profile;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use avatar::{Avatar, AvatarImage};
pub use link::{normalize_url, Link, PositionedLink};
pub use profile::{Profile, ProfilePatch, Theme};

/// Stable, caller-generated link identifier, unique within a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

/// Backend-issued identifier of an authenticated user (and their profile row).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(LinkId);
string_id!(UserId);
