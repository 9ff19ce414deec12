//! Normalization for the bounded, second-precision datetime type.
//!
//! The target backend's classic datetime type only represents instants
//! between 1753-01-01 and 9999-12-31 at whole-second precision.
//! Out-of-range values are clamped to the nearest bound, never rejected,
//! and sub-second components are truncated, never rounded.

use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;

lazy_static! {
    /// Lowest instant the bounded datetime type can represent.
    pub static ref DATETIME_MIN: DateTime<Utc> =
        Utc.with_ymd_and_hms(1753, 1, 1, 0, 0, 0).unwrap();

    /// Highest whole-second instant the bounded datetime type can represent.
    pub static ref DATETIME_MAX: DateTime<Utc> =
        Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
}

/// Clamp into the representable range, then truncate to whole seconds.
pub fn normalize_datetime(value: DateTime<Utc>) -> DateTime<Utc> {
    let clamped = if value < *DATETIME_MIN {
        *DATETIME_MIN
    } else if value > *DATETIME_MAX {
        *DATETIME_MAX
    } else {
        value
    };
    DateTime::from_timestamp(clamped.timestamp(), 0).unwrap_or(clamped)
}

/// Literal form of a bounded datetime, normalized first.
pub fn format_datetime(value: DateTime<Utc>) -> String {
    normalize_datetime(value)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Literal form of an unbounded datetime, full precision preserved.
pub fn format_datetime2(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}
