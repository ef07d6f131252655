//! Cassettes: recorded remote interactions used to replay CLI sessions offline.

pub mod format;
pub mod recorder;
pub mod replayer;
