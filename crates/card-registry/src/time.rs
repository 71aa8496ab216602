//! Time utilities for the card registry.
//!
//! Card timestamps are Unix epoch seconds (u64).

/// Return the current time as seconds since Unix epoch.
///
/// A clock set before the epoch yields 0.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Convert seconds to an RFC 3339 string.
pub fn secs_to_rfc3339(secs: u64) -> String {
    let dt = i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}
