//! Timestamp helpers.

use chrono::{DateTime, SubsecRound, Utc};

/// Current time truncated to whole seconds.
///
/// Entities are stamped with this so the value survives every storage backend
/// (and the textual file form) without precision loss.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
