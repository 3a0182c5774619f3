use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

pub fn millis_to_utc(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
}

/// Longest lookback accepted for history and activity windows.
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Start of a lookback window of `days`, clamped to `1..=MAX_WINDOW_DAYS`.
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days.clamp(1, MAX_WINDOW_DAYS))
}

pub fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Compact random identifier used for rows and session ids.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
