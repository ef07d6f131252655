//! Cassette data structures for recording and replaying interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single call made through a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the whole recording, assigned by the recorder.
    pub seq: u64,
    /// Port name: `auth`, `store`, `avatars`, `clock` or `id_gen`.
    pub port: String,
    /// Method invoked on the port.
    pub method: String,
    /// Arguments, with secrets left out.
    pub input: serde_json::Value,
    /// Return value; fallible calls use `{"Ok": v}` or `{"Err": message}`.
    pub output: serde_json::Value,
}

/// A recorded CLI invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name, usually the command that was run.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Parses a cassette from YAML.
    ///
    /// # Errors
    ///
    /// Returns the YAML error message when the document is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| format!("malformed cassette: {e}"))
    }
}
