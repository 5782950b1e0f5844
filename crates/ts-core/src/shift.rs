//! Shift apportioning.
//!
//! Splits a session's duration across recurring daily shift windows. Windows
//! are hour offsets from local midnight of the session's check-in date and may
//! be negative or run past 24, which is how a shift that crosses midnight
//! (e.g. 17:00 to 01:00) is represented.

use std::collections::HashSet;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boundaries of the default schedule, hours from midnight of the check-in day.
pub const DEFAULT_BOUNDARIES: [i32; 7] = [-15, -7, 1, 9, 17, 25, 33];

/// Shift names assigned cyclically to the default windows.
pub const DEFAULT_SHIFT_NAMES: [&str; 3] = ["Shift 1", "Shift 2", "Shift 3"];

/// Relative tolerance between a session's length and its apportioned total.
pub const SUM_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShiftError {
    #[error("shift schedule has no shifts")]
    Empty,
    #[error("shift boundaries must be strictly increasing with at least two entries: {0:?}")]
    UnorderedBoundaries(Vec<i32>),
    #[error("shift names cannot be empty")]
    EmptyName,
    #[error("duplicate shift name: {0}")]
    DuplicateName(String),
    #[error("shift {name} has an empty window [{start_hour}, {end_hour})")]
    EmptyWindow {
        name: String,
        start_hour: i32,
        end_hour: i32,
    },
    #[error("shift windows overlap: {first} and {second}")]
    OverlappingWindows { first: String, second: String },
}

/// Half-open window `[start_hour, end_hour)` relative to local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start_hour: i32,
    pub end_hour: i32,
}

/// A named shift and the windows that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub name: String,
    pub windows: Vec<ShiftWindow>,
}

/// A validated set of non-overlapping shifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSchedule {
    shifts: Vec<Shift>,
}

impl Default for ShiftSchedule {
    /// 09-17, 17-01 and 01-09, covering sessions that start on the check-in
    /// day and end before 09:00 the day after.
    fn default() -> Self {
        Self {
            shifts: cyclic_shifts(&DEFAULT_BOUNDARIES, &DEFAULT_SHIFT_NAMES),
        }
    }
}

/// Assigns consecutive boundary windows to names round-robin.
fn cyclic_shifts<S: AsRef<str>>(boundaries: &[i32], names: &[S]) -> Vec<Shift> {
    let mut shifts: Vec<Shift> = names
        .iter()
        .map(|n| Shift {
            name: n.as_ref().to_string(),
            windows: Vec::new(),
        })
        .collect();
    for (j, pair) in boundaries.windows(2).enumerate() {
        shifts[j % names.len()].windows.push(ShiftWindow {
            start_hour: pair[0],
            end_hour: pair[1],
        });
    }
    shifts
}

impl ShiftSchedule {
    /// Builds a schedule from explicit windows per shift.
    pub fn new(shifts: Vec<Shift>) -> Result<Self, ShiftError> {
        if shifts.is_empty() {
            return Err(ShiftError::Empty);
        }

        let mut seen = HashSet::new();
        for shift in &shifts {
            if shift.name.trim().is_empty() {
                return Err(ShiftError::EmptyName);
            }
            if !seen.insert(shift.name.as_str()) {
                return Err(ShiftError::DuplicateName(shift.name.clone()));
            }
            for w in &shift.windows {
                if w.start_hour >= w.end_hour {
                    return Err(ShiftError::EmptyWindow {
                        name: shift.name.clone(),
                        start_hour: w.start_hour,
                        end_hour: w.end_hour,
                    });
                }
            }
        }

        let mut all: Vec<(&str, ShiftWindow)> = shifts
            .iter()
            .flat_map(|s| s.windows.iter().map(move |w| (s.name.as_str(), *w)))
            .collect();
        all.sort_by_key(|(_, w)| w.start_hour);
        for pair in all.windows(2) {
            let (first_name, first) = pair[0];
            let (second_name, second) = pair[1];
            if first.end_hour > second.start_hour {
                return Err(ShiftError::OverlappingWindows {
                    first: format!("{first_name} [{}, {})", first.start_hour, first.end_hour),
                    second: format!(
                        "{second_name} [{}, {})",
                        second.start_hour, second.end_hour
                    ),
                });
            }
        }

        Ok(Self { shifts })
    }

    /// Builds a schedule from consecutive boundaries, assigning window `j` to
    /// `names[j % names.len()]`.
    pub fn from_boundaries<S: AsRef<str>>(
        boundaries: &[i32],
        names: &[S],
    ) -> Result<Self, ShiftError> {
        if names.is_empty() {
            return Err(ShiftError::Empty);
        }
        if boundaries.len() < 2 || boundaries.windows(2).any(|p| p[0] >= p[1]) {
            return Err(ShiftError::UnorderedBoundaries(boundaries.to_vec()));
        }
        Self::new(cyclic_shifts(boundaries, names))
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn names(&self) -> Vec<String> {
        self.shifts.iter().map(|s| s.name.clone()).collect()
    }

    /// Splits `[check_in, check_out]` across the shifts.
    ///
    /// The check-in date's midnight anchors every window; overlap per window
    /// is `max(0, min(out, end) - max(in, start))`.
    pub fn apportion(&self, check_in: NaiveDateTime, check_out: NaiveDateTime) -> Apportionment {
        let day = check_in.date().and_time(NaiveTime::MIN);

        let per_shift: Vec<TimeDelta> = self
            .shifts
            .iter()
            .map(|shift| {
                shift
                    .windows
                    .iter()
                    .map(|w| {
                        let start = day + TimeDelta::hours(i64::from(w.start_hour));
                        let end = day + TimeDelta::hours(i64::from(w.end_hour));
                        let overlap = check_out.min(end) - check_in.max(start);
                        overlap.max(TimeDelta::zero())
                    })
                    .fold(TimeDelta::zero(), |acc, d| acc + d)
            })
            .collect();

        Apportionment {
            session: check_out - check_in,
            per_shift,
        }
    }
}

/// How one session's time fell into the shifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apportionment {
    /// Raw session length.
    pub session: TimeDelta,
    /// Time per shift, in schedule order.
    pub per_shift: Vec<TimeDelta>,
}

impl Apportionment {
    /// Total time the windows accounted for.
    pub fn covered(&self) -> TimeDelta {
        self.per_shift
            .iter()
            .fold(TimeDelta::zero(), |acc, d| acc + *d)
    }

    /// True when the shifts account for the session within [`SUM_TOLERANCE`].
    #[allow(clippy::cast_precision_loss)]
    pub fn is_balanced(&self) -> bool {
        let session_ms = self.session.num_milliseconds();
        let diff_ms = (self.covered().num_milliseconds() - session_ms).abs();
        if session_ms == 0 {
            return diff_ms == 0;
        }
        (diff_ms as f64) < SUM_TOLERANCE * (session_ms.abs() as f64)
    }
}
