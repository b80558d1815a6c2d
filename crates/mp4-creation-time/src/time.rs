//! Conversions for timestamps counted from the Mac HFS+ epoch.

use chrono::{DateTime, SecondsFormat, Utc};

/// Seconds between 1904-01-01T00:00:00Z and 1970-01-01T00:00:00Z.
pub const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Converts seconds since 1904-01-01T00:00:00Z into a UTC date time.
///
/// Returns `None` when the value lies outside of the range chrono can
/// represent.
pub fn from_mac_seconds(seconds: u64) -> Option<DateTime<Utc>> {
    let unix_seconds = i64::try_from(seconds).ok()?.checked_sub(MAC_EPOCH_OFFSET)?;
    let unix_millis = unix_seconds.checked_mul(1000)?;
    DateTime::from_timestamp_millis(unix_millis)
}

/// Renders `timestamp` as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn mac_seconds_to_iso8601(seconds: u64) -> Option<String> {
    from_mac_seconds(seconds).map(|timestamp| to_iso8601(&timestamp))
}
