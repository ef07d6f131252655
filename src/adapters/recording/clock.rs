//! Recording adapter for the `Clock` port.

use chrono::{DateTime, Utc};

use super::{record_interaction, SharedRecorder};
use crate::ports::Clock;

/// Records clock reads while delegating to an inner implementation.
pub struct RecordingClock {
    inner: Box<dyn Clock>,
    recorder: SharedRecorder,
}

impl RecordingClock {
    /// Creates a new recording clock wrapping the given implementation.
    pub fn new(inner: Box<dyn Clock>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        let result = self.inner.now();
        record_interaction(&self.recorder, "clock", "now", &(), &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::LiveClock;
    use crate::adapters::recording::test_support::{interactions, recorder};

    #[test]
    fn records_now_interaction() {
        let recorder = recorder(&std::env::temp_dir().join("linkhub_rec_clock.cassette.yaml"));
        let clock = RecordingClock::new(Box::new(LiveClock), recorder.clone());
        let now = clock.now();

        let recorded = interactions(&recorder);
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].port, "clock");
        assert_eq!(recorded[0].output, serde_json::to_value(now).unwrap());
    }
}
