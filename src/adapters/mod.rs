//! Adapter implementations for port traits.
//!
//! - `live` talks to the hosted backend and the local disk.
//! - `recording` wraps live adapters and writes a cassette.
//! - `replaying` serves a cassette back.
//! - `memory` keeps everything in process.

pub mod live;
pub mod memory;
pub mod recording;
pub mod replaying;
