//! Cell values shared by the CSV and workbook readers.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};

/// Text layouts accepted for the `Time` column, tried in order.
const TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// A single cell, reduced to what the readers care about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Wraps text, treating blank strings as empty.
    pub fn text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The cell as text. Whole numbers print without a fraction so numeric
    /// ids read back as `42`, not `42.0`.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(n.to_string()),
            Self::DateTime(dt) => Some(dt.to_string()),
        }
    }

    /// The cell as a timestamp in the table's zone, `zone_hours` from UTC.
    ///
    /// Only text carrying its own offset is converted; everything else is
    /// already written in the table's zone. Numbers are read as spreadsheet
    /// serial dates (days since 1899-12-30).
    pub fn as_timestamp(&self, zone_hours: i32) -> Option<NaiveDateTime> {
        match self {
            Self::Empty => None,
            Self::DateTime(dt) => Some(*dt),
            Self::Text(s) => parse_timestamp_in(s, zone_hours),
            Self::Number(n) => serial_to_datetime(*n),
        }
    }
}

/// Parses a timestamp written as text. Zoned values are converted to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    parse_timestamp_in(s, 0)
}

/// Parses a timestamp written as text, converting zoned values to the zone
/// `zone_hours` from UTC. Unzoned values are returned as written. A bare
/// date reads as its midnight.
pub fn parse_timestamp_in(s: &str, zone_hours: i32) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        let zone = FixedOffset::east_opt(zone_hours.checked_mul(3600)?)?;
        return Some(dt.with_timezone(&zone).naive_local());
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[allow(clippy::cast_possible_truncation)]
fn serial_to_datetime(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() || days < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (days * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::milliseconds(millis))
}
