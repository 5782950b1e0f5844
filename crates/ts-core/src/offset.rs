//! Whole-hour UTC offsets as written in sheet headers and on the command line.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Matches `-5`, `+03`, `UTC-05:00`, `GMT+2`. Minutes are captured separately.
static OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:utc|gmt)?\s*([+-])?\s*(\d{1,2})(?::?(\d{2}))?$").unwrap()
});

/// Finds an embedded `UTC±HH[:MM]` tag inside longer text such as `Time (UTC-05:00)`.
static EMBEDDED_OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:utc|gmt)\s*[+-]\s*\d{1,2}(?::?\d{2})?").unwrap());

/// Largest offset in use anywhere (UTC+14).
const MAX_OFFSET_HOURS: i32 = 14;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OffsetError {
    #[error("invalid UTC offset: {0:?}")]
    Invalid(String),
    #[error("UTC offset {0:?} is not a whole number of hours")]
    FractionalHours(String),
    #[error("UTC offset {0:?} is out of range")]
    OutOfRange(String),
}

/// Parses a signed whole-hour offset.
pub fn parse_utc_offset(s: &str) -> Result<i32, OffsetError> {
    let trimmed = s.trim();
    let Some(caps) = OFFSET_RE.captures(trimmed) else {
        return Err(OffsetError::Invalid(s.to_string()));
    };

    if caps.get(3).is_some_and(|m| m.as_str() != "00") {
        return Err(OffsetError::FractionalHours(s.to_string()));
    }

    let hours: i32 = caps[2]
        .parse()
        .map_err(|_| OffsetError::Invalid(s.to_string()))?;
    if hours > MAX_OFFSET_HOURS {
        return Err(OffsetError::OutOfRange(s.to_string()));
    }

    match caps.get(1).map(|m| m.as_str()) {
        Some("-") => Ok(-hours),
        _ => Ok(hours),
    }
}

/// Looks for a `UTC±HH` tag anywhere in `text`.
///
/// Returns `None` when there is no tag or the tag is not a whole-hour offset.
pub fn find_utc_offset(text: &str) -> Option<i32> {
    let tag = EMBEDDED_OFFSET_RE.find(text)?;
    match parse_utc_offset(tag.as_str()) {
        Ok(hours) => Some(hours),
        Err(e) => {
            tracing::debug!(error = %e, text, "ignoring unusable offset tag");
            None
        }
    }
}

/// Formats an offset as `UTC+N` / `UTC-N`.
pub fn format_utc_offset(hours: i32) -> String {
    if hours < 0 {
        format!("UTC{hours}")
    } else {
        format!("UTC+{hours}")
    }
}
