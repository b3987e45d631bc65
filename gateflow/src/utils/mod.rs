//! Utility helpers for request ids and event timestamps.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Generates a new UUID v4.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Returns the current UTC time as an RFC 3339 formatted string.
///
/// Used to stamp event payloads emitted to the observability sink.
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
