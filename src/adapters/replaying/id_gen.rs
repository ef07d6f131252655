//! Replaying adapter for the `IdGenerator` port.

use super::{replay_plain, SharedReplayer};
use crate::ports::IdGenerator;

/// Replays recorded link ids from a cassette.
pub struct ReplayingIdGenerator {
    replayer: SharedReplayer,
}

impl ReplayingIdGenerator {
    /// Creates a replaying ID generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl IdGenerator for ReplayingIdGenerator {
    fn generate_id(&self) -> String {
        replay_plain(&self.replayer, "id_gen", "generate_id")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::adapters::replaying::test_support::replayer;

    #[test]
    fn serves_recorded_ids() {
        let ids = ReplayingIdGenerator::new(replayer(&[
            ("id_gen", "generate_id", json!("link-1")),
            ("id_gen", "generate_id", json!("link-2")),
        ]));
        assert_eq!(ids.generate_id(), "link-1");
        assert_eq!(ids.generate_id(), "link-2");
    }
}
