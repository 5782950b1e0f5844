//! Per-person aggregation of a whole attendance table.
//!
//! [`Timesheet::build`] is the load operation: it groups events by person,
//! reconciles each person's sessions, apportions them into shifts and keeps
//! the result as one immutable value that every query reads from.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use thiserror::Error;

use crate::event::Event;
use crate::reconcile::{Anomalies, AnomalyKind, DuplicateCheckIn, Session, Warning, reconcile};
use crate::report;
use crate::shift::ShiftSchedule;
use crate::types::PersonKey;

/// Label of the synthetic entry that selects the ranked overview.
pub const OVERVIEW_LABEL: &str = "Overview";

/// Errors returned by timesheet queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("no person matches {0:?}")]
    NotFound(String),
}

/// Settings for one load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Zone the timesheet is reported in, in whole hours from UTC.
    pub timezone_offset_hours: i32,
    /// Zone the table's timestamps were written in, if the table says.
    pub declared_offset_hours: Option<i32>,
    pub duplicate_check_in: DuplicateCheckIn,
    pub schedule: ShiftSchedule,
}

impl LoadOptions {
    /// Hours added to every timestamp before reconciliation.
    pub fn applied_shift_hours(&self) -> i32 {
        self.timezone_offset_hours - self.declared_offset_hours.unwrap_or(0)
    }
}

/// Accumulated time for one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftTotal {
    pub name: String,
    pub duration: TimeDelta,
}

/// Everything computed for one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonSummary {
    pub key: PersonKey,
    pub sessions: Vec<Session>,
    pub total: TimeDelta,
    /// In schedule order.
    pub per_shift: Vec<ShiftTotal>,
    pub anomalies: Anomalies,
    pub warnings: Vec<Warning>,
}

/// One row of the ranked overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewEntry {
    pub key: PersonKey,
    pub label: String,
    pub total_ms: i64,
}

/// What the presentation layer asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Overview,
    Person(PersonKey),
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overview => f.write_str(OVERVIEW_LABEL),
            Self::Person(key) => write!(f, "{key}"),
        }
    }
}

/// Result of loading one attendance table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timesheet {
    /// In order of first appearance in the table.
    persons: Vec<PersonSummary>,
    index: HashMap<PersonKey, usize>,
    shift_names: Vec<String>,
    span: Option<(NaiveDateTime, NaiveDateTime)>,
    timezone_offset_hours: i32,
    event_count: usize,
}

impl Timesheet {
    /// Reconciles every person in `events`. Never fails; irregular rows end up
    /// as anomalies or warnings on the person they belong to.
    pub fn build(events: &[Event], options: &LoadOptions) -> Self {
        let shift_hours = options.applied_shift_hours();
        let events: Vec<Event> = if shift_hours == 0 {
            events.to_vec()
        } else {
            events.iter().map(|e| e.shifted(shift_hours)).collect()
        };

        let span = events
            .iter()
            .map(|e| e.timestamp)
            .min()
            .zip(events.iter().map(|e| e.timestamp).max());

        let mut order: Vec<PersonKey> = Vec::new();
        let mut grouped: HashMap<&PersonKey, Vec<&Event>> = HashMap::new();
        for event in &events {
            grouped
                .entry(&event.person)
                .or_insert_with(|| {
                    order.push(event.person.clone());
                    Vec::new()
                })
                .push(event);
        }

        let persons: Vec<PersonSummary> = order
            .into_iter()
            .map(|key| {
                let person_events = grouped.remove(&key).unwrap_or_default();
                summarize(key, &person_events, options)
            })
            .collect();

        let index = persons
            .iter()
            .enumerate()
            .map(|(i, p)| (p.key.clone(), i))
            .collect();

        tracing::debug!(
            events = events.len(),
            persons = persons.len(),
            shift_hours,
            "timesheet built"
        );

        Self {
            persons,
            index,
            shift_names: options.schedule.names(),
            span,
            timezone_offset_hours: options.timezone_offset_hours,
            event_count: events.len(),
        }
    }

    pub fn persons(&self) -> &[PersonSummary] {
        &self.persons
    }

    pub fn person(&self, key: &PersonKey) -> Option<&PersonSummary> {
        self.index.get(key).map(|&i| &self.persons[i])
    }

    pub fn shift_names(&self) -> &[String] {
        &self.shift_names
    }

    /// Earliest and latest timestamp across all events.
    pub const fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.span
    }

    pub const fn timezone_offset_hours(&self) -> i32 {
        self.timezone_offset_hours
    }

    pub const fn event_count(&self) -> usize {
        self.event_count
    }

    /// Persons with time logged, most time first. Ties sort by label.
    pub fn ranked(&self) -> Vec<&PersonSummary> {
        let mut ranked: Vec<_> = self
            .persons
            .iter()
            .filter(|p| p.total > TimeDelta::zero())
            .collect();
        ranked.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.key.label().cmp(&b.key.label()))
                .then_with(|| a.key.cmp(&b.key))
        });
        ranked
    }

    /// The ranked overview; zero-duration persons are left out.
    pub fn overview(&self) -> Vec<OverviewEntry> {
        self.ranked()
            .into_iter()
            .map(|p| OverviewEntry {
                key: p.key.clone(),
                label: p.key.label(),
                total_ms: p.total.num_milliseconds(),
            })
            .collect()
    }

    /// Overview rendered one `"<duration>  <label>"` row per person.
    pub fn overview_text(&self) -> String {
        report::render_overview(&self.ranked())
    }

    /// `"Overview"` followed by the labels of everyone in the overview,
    /// alphabetically.
    pub fn selectable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.ranked().iter().map(|p| p.key.label()).collect();
        names.sort();
        names.insert(0, OVERVIEW_LABEL.to_string());
        names
    }

    /// Finds the person whose display label is `label`.
    pub fn resolve_label(&self, label: &str) -> Option<&PersonKey> {
        self.persons
            .iter()
            .map(|p| &p.key)
            .find(|key| key.label() == label)
    }

    /// Maps a label from [`Self::selectable_names`] back to a selection.
    pub fn selection(&self, label: &str) -> Result<Selection, QueryError> {
        if label == OVERVIEW_LABEL {
            return Ok(Selection::Overview);
        }
        self.resolve_label(label)
            .map(|key| Selection::Person(key.clone()))
            .ok_or_else(|| QueryError::NotFound(label.to_string()))
    }

    /// Text for a selection: the overview itself, or one person's breakdown.
    pub fn detail(&self, selection: &Selection) -> Result<String, QueryError> {
        match selection {
            Selection::Overview => Ok(self.overview_text()),
            Selection::Person(key) => self
                .person(key)
                .map(|p| report::render_detail(p, self.timezone_offset_hours))
                .ok_or_else(|| QueryError::NotFound(key.label())),
        }
    }

    /// [`Self::detail`] addressed by display label.
    pub fn detail_text(&self, label: &str) -> Result<String, QueryError> {
        self.detail(&self.selection(label)?)
    }
}

fn summarize(key: PersonKey, events: &[&Event], options: &LoadOptions) -> PersonSummary {
    let rec = reconcile(events.iter().copied(), options.duplicate_check_in);
    let mut warnings = rec.warnings;

    let mut per_shift: Vec<TimeDelta> = vec![TimeDelta::zero(); options.schedule.shifts().len()];
    for session in &rec.sessions {
        let split = options.schedule.apportion(session.check_in, session.check_out);
        for (acc, d) in per_shift.iter_mut().zip(&split.per_shift) {
            *acc += *d;
        }
        if !split.is_balanced() {
            tracing::warn!(
                person = %key,
                check_in = %session.check_in,
                check_out = %session.check_out,
                session_ms = split.session.num_milliseconds(),
                apportioned_ms = split.covered().num_milliseconds(),
                "shift windows do not cover session"
            );
            warnings.push(Warning::ShiftSumMismatch {
                check_in: session.check_in,
                check_out: session.check_out,
                session_ms: split.session.num_milliseconds(),
                apportioned_ms: split.covered().num_milliseconds(),
            });
        }
    }

    if !rec.anomalies.is_empty() {
        tracing::debug!(
            person = %key,
            crashes = rec.anomalies.count(AnomalyKind::Crashes),
            pre = rec.anomalies.count(AnomalyKind::Pre),
            post = rec.anomalies.count(AnomalyKind::Post),
            other = rec.anomalies.count(AnomalyKind::Other),
            "irregular events"
        );
    }

    PersonSummary {
        key,
        sessions: rec.sessions,
        total: rec.total,
        per_shift: options
            .schedule
            .names()
            .into_iter()
            .zip(per_shift)
            .map(|(name, duration)| ShiftTotal { name, duration })
            .collect(),
        anomalies: rec.anomalies,
        warnings,
    }
}
