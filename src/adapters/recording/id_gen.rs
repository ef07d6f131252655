//! Recording adapter for the `IdGenerator` port.

use super::{record_interaction, SharedRecorder};
use crate::ports::IdGenerator;

/// Records generated link ids while delegating to an inner implementation.
pub struct RecordingIdGenerator {
    inner: Box<dyn IdGenerator>,
    recorder: SharedRecorder,
}

impl RecordingIdGenerator {
    /// Creates a new recording ID generator wrapping the given implementation.
    pub fn new(inner: Box<dyn IdGenerator>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl IdGenerator for RecordingIdGenerator {
    fn generate_id(&self) -> String {
        let id = self.inner.generate_id();
        record_interaction(&self.recorder, "id_gen", "generate_id", &(), &id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::LiveIdGenerator;
    use crate::adapters::recording::test_support::{interactions, recorder};

    #[test]
    fn records_each_generated_id() {
        let recorder = recorder(&std::env::temp_dir().join("linkhub_rec_id.cassette.yaml"));
        let ids = RecordingIdGenerator::new(Box::new(LiveIdGenerator), recorder.clone());
        let first = ids.generate_id();
        let second = ids.generate_id();

        let recorded = interactions(&recorder);
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].output, serde_json::json!(first));
        assert_eq!(recorded[1].output, serde_json::json!(second));
    }
}
