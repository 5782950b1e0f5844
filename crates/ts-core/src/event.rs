//! Check-in/check-out events as read from an attendance table.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::types::PersonKey;

/// What a person did at a point in time.
///
/// Labels are matched ignoring case and whitespace, so `"Check In"`,
/// `"check in"` and `"CheckIn"` are the same action. Anything else is kept
/// verbatim as [`Action::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    CheckIn,
    CheckOut,
    Other(String),
}

impl Action {
    /// Parses a table label. Never fails; unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        let folded: String = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "checkin" => Self::CheckIn,
            "checkout" => Self::CheckOut,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckIn => "Check In",
            Self::CheckOut => "Check Out",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Action {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_label(&s))
    }
}

/// A single row of the attendance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub person: PersonKey,
    pub action: Action,
    /// Wall-clock time, already in the zone the timesheet is reported in.
    pub timestamp: NaiveDateTime,
    /// 1-based row number in the source table, kept for audits.
    pub position: usize,
}

impl Event {
    pub const fn new(
        person: PersonKey,
        action: Action,
        timestamp: NaiveDateTime,
        position: usize,
    ) -> Self {
        Self {
            person,
            action,
            timestamp,
            position,
        }
    }

    /// Returns a copy with the timestamp moved by `hours`.
    #[must_use]
    pub fn shifted(&self, hours: i32) -> Self {
        Self {
            timestamp: self.timestamp + TimeDelta::hours(i64::from(hours)),
            ..self.clone()
        }
    }
}
