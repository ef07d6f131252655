//! ID generator port for new link identifiers.

/// Generates identifiers for links created locally.
///
/// Link ids are chosen by the client before the link is ever persisted,
/// so the generator must not repeat within a profile.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
