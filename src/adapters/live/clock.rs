//! System clock adapter.

use chrono::{DateTime, SubsecRound, Utc};

use crate::ports::Clock;

/// Wall-clock time, truncated to microseconds to match the `timestamptz`
/// columns it is written to.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}
