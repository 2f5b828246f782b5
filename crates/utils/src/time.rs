use chrono::Utc;

/// Seconds since the Unix epoch, rounded to the nearest whole second.
///
/// Readers of the per-second buckets derive their key the same way, so both
/// sides must agree on rounding rather than truncation.
pub fn seconds_since_epoch() -> i64 {
    round_millis_to_seconds(Utc::now().timestamp_millis())
}

pub fn round_millis_to_seconds(millis: i64) -> i64 {
    (millis + 500).div_euclid(1000)
}
