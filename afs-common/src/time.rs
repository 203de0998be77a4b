//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC timestamp at storage precision (microseconds)
///
/// Values returned to callers then compare equal to what is read back later.
pub fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Format a timestamp for storage in a TEXT column
///
/// Always RFC 3339 with microsecond precision and a `Z` suffix, so every stored
/// value has the same width and lexical order matches chronological order.
pub fn to_db_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
