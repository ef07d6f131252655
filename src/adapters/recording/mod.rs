//! Recording adapters that capture interactions to cassettes.
//!
//! Each adapter delegates to an inner implementation and appends the call to
//! a shared [`CassetteRecorder`]. Passwords and access tokens never reach the
//! cassette.

pub mod auth;
pub mod avatars;
pub mod clock;
pub mod id_gen;
pub mod store;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{json, Value};

use crate::cassette::recorder::CassetteRecorder;

pub use auth::RecordingAuthenticator;
pub use avatars::RecordingAvatarStore;
pub use clock::RecordingClock;
pub use id_gen::RecordingIdGenerator;
pub use store::RecordingProfileStore;

/// Shared handle to the recorder of one CLI invocation.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Records an interaction with a plain (infallible) return value.
///
/// Counterpart of `replaying::next_output`.
pub(crate) fn record_interaction<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize + ?Sized,
    O: Serialize + ?Sized,
{
    push(recorder, port, method, to_value(input), to_value(output));
}

/// Records a fallible interaction as `{"Ok": v}` or `{"Err": message}`.
///
/// Counterpart of `replaying::replay_result`.
pub(crate) fn record_result<T, E, I>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize + ?Sized,
{
    let output = match result {
        Ok(v) => json!({ "Ok": to_value(v) }),
        Err(e) => json!({ "Err": e.to_string() }),
    };
    push(recorder, port, method, to_value(input), output);
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn push(recorder: &SharedRecorder, port: &str, method: &str, input: Value, output: Value) {
    match recorder.lock() {
        Ok(mut guard) => guard.record(port, method, input, output),
        Err(_) => tracing::warn!(port, method, "cassette recorder poisoned; interaction dropped"),
    }
}
