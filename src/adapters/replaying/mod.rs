//! Replaying adapters that serve recorded interactions.
//!
//! All adapters of one context share a single [`CassetteReplayer`]; calls
//! are matched by port and method, in recorded order. Inputs are not
//! compared, so a replay follows whatever the command asks for next.

pub mod auth;
pub mod avatars;
pub mod clock;
pub mod id_gen;
pub mod store;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::PortError;

pub use auth::ReplayingAuthenticator;
pub use avatars::ReplayingAvatarStore;
pub use clock::ReplayingClock;
pub use id_gen::ReplayingIdGenerator;
pub use store::ReplayingProfileStore;

/// Shared handle to the replayer of one context.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Takes the output of the next recorded call to `port::method`.
///
/// Counterpart of `recording::record_interaction`.
pub(crate) fn next_output(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
) -> Result<Value, String> {
    let mut guard = replayer.lock().map_err(|_| "cassette replayer poisoned".to_string())?;
    let interaction = guard.next_interaction(port, method)?;
    Ok(interaction.output.clone())
}

/// Decodes a recorded `{"Ok": v}` / `{"Err": message}` output.
///
/// Counterpart of `recording::record_result`. A missing interaction or an
/// undecodable value is reported as a port error as well.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: Result<Value, String>,
) -> Result<T, PortError> {
    let mut output = output?;
    if let Some(message) = output.get("Err") {
        let message = message.as_str().map_or_else(|| message.to_string(), str::to_string);
        return Err(message.into());
    }
    let value = output
        .get_mut("Ok")
        .map(Value::take)
        .ok_or_else(|| format!("recorded output is neither Ok nor Err: {output}"))?;
    serde_json::from_value(value).map_err(|e| format!("recorded value does not decode: {e}").into())
}

/// Decodes a plain recorded output for ports that cannot fail.
///
/// # Panics
///
/// Panics when the cassette has nothing usable; an infallible port has no
/// other way to report that the replay diverged from the recording.
pub(crate) fn replay_plain<T: DeserializeOwned>(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
) -> T {
    let output = next_output(replayer, port, method).unwrap_or_else(|e| panic!("{e}"));
    serde_json::from_value(output)
        .unwrap_or_else(|e| panic!("{port}::{method}: recorded value does not decode: {e}"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use serde_json::Value;

    use super::SharedReplayer;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::cassette::replayer::CassetteReplayer;

    /// Builds a replayer from `(port, method, output)` triples.
    pub fn replayer(calls: &[(&str, &str, Value)]) -> SharedReplayer {
        let interactions = calls
            .iter()
            .zip(0..)
            .map(|((port, method, output), seq)| Interaction {
                seq,
                port: (*port).to_string(),
                method: (*method).to_string(),
                input: Value::Null,
                output: output.clone(),
            })
            .collect();
        let cassette = Cassette { name: "test".into(), recorded_at: Utc::now(), interactions };
        SharedReplayer::new(std::sync::Mutex::new(CassetteReplayer::new(&cassette)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_ok_and_err_outputs() {
        let ok: Result<u32, PortError> = replay_result(Ok(json!({"Ok": 7})));
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32, PortError> = replay_result(Ok(json!({"Err": "boom"})));
        assert_eq!(err.unwrap_err().to_string(), "boom");

        let missing: Result<u32, PortError> = replay_result(Err("cassette exhausted".into()));
        assert_eq!(missing.unwrap_err().to_string(), "cassette exhausted");

        let bare: Result<u32, PortError> = replay_result(Ok(json!(7)));
        assert!(bare.is_err());
    }
}
