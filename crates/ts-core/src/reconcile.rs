//! Session reconciliation.
//!
//! Pairs one person's check-in/check-out events into completed sessions.
//!
//! # Algorithm Summary
//!
//! Each person starts `LoggedOut`. A check-in opens a pending session and a
//! check-out closes it. Events that do not fit this alternation are sorted
//! into anomaly buckets rather than aborting:
//!
//! - `crashes`: check-in while already logged in (client crash skipped the logout)
//! - `pre`: check-out with no open session (session began before the table)
//! - `post`: session still open when the events run out (excluded from totals)
//! - `other`: an action that is neither check-in nor check-out

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::event::{Action, Event};

/// What to do with the open session when a second check-in arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCheckIn {
    /// Keep the open session; it closes at the next check-out.
    #[default]
    Keep,
    /// Drop the stale check-in and open from the duplicate instead.
    Restart,
    /// Close the stale session at the duplicate and open a new one there.
    Close,
}

impl DuplicateCheckIn {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Restart => "restart",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for DuplicateCheckIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DuplicateCheckIn {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(Self::Keep),
            "restart" => Ok(Self::Restart),
            "close" => Ok(Self::Close),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Error type for unknown duplicate check-in policy strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown duplicate check-in policy: {} (expected keep, restart or close)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPolicy {}

/// Classification of an event that could not be paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Duplicate check-in while logged in.
    Crashes,
    /// Orphan check-out before any check-in.
    Pre,
    /// Session left open at the end of the table.
    Post,
    /// Unrecognized action.
    Other,
}

impl AnomalyKind {
    pub const ALL: [Self; 4] = [Self::Crashes, Self::Pre, Self::Post, Self::Other];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Crashes => "crashes",
            Self::Pre => "pre",
            Self::Post => "post",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offending events, one ordered bucket per [`AnomalyKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Anomalies {
    pub crashes: Vec<Event>,
    pub pre: Vec<Event>,
    pub post: Vec<Event>,
    pub other: Vec<Event>,
}

impl Anomalies {
    fn bucket_mut(&mut self, kind: AnomalyKind) -> &mut Vec<Event> {
        match kind {
            AnomalyKind::Crashes => &mut self.crashes,
            AnomalyKind::Pre => &mut self.pre,
            AnomalyKind::Post => &mut self.post,
            AnomalyKind::Other => &mut self.other,
        }
    }

    pub fn push(&mut self, kind: AnomalyKind, event: Event) {
        self.bucket_mut(kind).push(event);
    }

    pub fn get(&self, kind: AnomalyKind) -> &[Event] {
        match kind {
            AnomalyKind::Crashes => &self.crashes,
            AnomalyKind::Pre => &self.pre,
            AnomalyKind::Post => &self.post,
            AnomalyKind::Other => &self.other,
        }
    }

    pub fn count(&self, kind: AnomalyKind) -> usize {
        self.get(kind).len()
    }

    pub fn total(&self) -> usize {
        AnomalyKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All records, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (AnomalyKind, &Event)> {
        AnomalyKind::ALL
            .into_iter()
            .flat_map(move |kind| self.get(kind).iter().map(move |e| (kind, e)))
    }
}

/// One completed check-in/check-out pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub check_in: NaiveDateTime,
    pub check_out: NaiveDateTime,
}

impl Session {
    pub fn duration(&self) -> TimeDelta {
        self.check_out - self.check_in
    }
}

/// A problem found while computing a person's totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Check-out earlier than its check-in; the pair is left out of the totals.
    NegativeDuration {
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
        position: usize,
    },
    /// Shift windows did not account for the whole session.
    ShiftSumMismatch {
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
        session_ms: i64,
        apportioned_ms: i64,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeDuration {
                check_in,
                check_out,
                position,
            } => write!(
                f,
                "negative duration: in {check_in}, out {check_out} (row {position})"
            ),
            Self::ShiftSumMismatch {
                check_in,
                check_out,
                session_ms,
                apportioned_ms,
            } => write!(
                f,
                "shift sum mismatch: in {check_in}, out {check_out}, session {session_ms} ms, shifts {apportioned_ms} ms"
            ),
        }
    }
}

/// Result of reconciling one person's events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Completed sessions in the order they closed.
    pub sessions: Vec<Session>,
    pub anomalies: Anomalies,
    pub warnings: Vec<Warning>,
    /// Sum of all completed session durations.
    pub total: TimeDelta,
}

impl Reconciliation {
    /// Records a closed pair, or a warning if it runs backwards.
    fn close(&mut self, check_in: &Event, check_out: NaiveDateTime, position: usize) {
        let session = Session {
            check_in: check_in.timestamp,
            check_out,
        };
        let duration = session.duration();
        if duration < TimeDelta::zero() {
            tracing::warn!(
                person = %check_in.person,
                check_in = %session.check_in,
                check_out = %session.check_out,
                row = position,
                "check-out precedes check-in, excluding pair from totals"
            );
            self.warnings.push(Warning::NegativeDuration {
                check_in: session.check_in,
                check_out: session.check_out,
                position,
            });
            return;
        }
        self.total += duration;
        self.sessions.push(session);
    }
}

/// Reconciliation state for one person.
#[derive(Debug, Clone)]
enum State {
    LoggedOut,
    /// The event that opened the pending session.
    LoggedIn(Event),
}

/// Pairs a single person's events into sessions.
///
/// Events must be in chronological order; they are not re-sorted. Malformed
/// sequences never fail, they only add anomalies or warnings.
pub fn reconcile<'a, I>(events: I, policy: DuplicateCheckIn) -> Reconciliation
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut result = Reconciliation::default();
    let mut state = State::LoggedOut;

    for event in events {
        state = match (state, &event.action) {
            (State::LoggedOut, Action::CheckIn) => State::LoggedIn(event.clone()),

            (State::LoggedIn(open), Action::CheckOut) => {
                result.close(&open, event.timestamp, event.position);
                State::LoggedOut
            }

            (State::LoggedIn(open), Action::CheckIn) => {
                result.anomalies.push(AnomalyKind::Crashes, event.clone());
                match policy {
                    DuplicateCheckIn::Keep => State::LoggedIn(open),
                    DuplicateCheckIn::Restart => State::LoggedIn(event.clone()),
                    DuplicateCheckIn::Close => {
                        result.close(&open, event.timestamp, event.position);
                        State::LoggedIn(event.clone())
                    }
                }
            }

            (State::LoggedOut, Action::CheckOut) => {
                result.anomalies.push(AnomalyKind::Pre, event.clone());
                State::LoggedOut
            }

            (current, Action::Other(_)) => {
                result.anomalies.push(AnomalyKind::Other, event.clone());
                current
            }
        };
    }

    if let State::LoggedIn(open) = state {
        result.anomalies.push(AnomalyKind::Post, open);
    }

    result
}
