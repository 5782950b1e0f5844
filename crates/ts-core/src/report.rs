//! Rendering of timesheet results: overview and detail text, flat export
//! rows, timeline data for charts, and the anomaly listing.

use std::fmt::Write;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::offset::format_utc_offset;
use crate::reconcile::{Anomalies, AnomalyKind, Session, Warning};
use crate::timesheet::{PersonSummary, Timesheet};

// ========== Duration Formatting ==========

/// Formats a duration as `"Xh MMm"`, flooring to the minute.
/// Negative durations are shown as zero.
pub fn format_hm(duration: TimeDelta) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!("{hours}h {minutes:02}m")
}

/// Fractional hours, as written to the flat export.
#[allow(clippy::cast_precision_loss)]
pub fn hours(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

// ========== Text Views ==========

/// One `"<duration>  <label>"` row per person, durations right-aligned.
pub fn render_overview(ranked: &[&PersonSummary]) -> String {
    let mut output = String::new();
    for person in ranked {
        writeln!(output, "{:>10}  {}", format_hm(person.total), person.key).unwrap();
    }
    output
}

/// Per-person breakdown: sessions, shift totals, anomaly counts and warnings.
pub fn render_detail(person: &PersonSummary, timezone_offset_hours: i32) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "{} - clocked time: {}",
        person.key,
        format_hm(person.total)
    )
    .unwrap();
    writeln!(output).unwrap();
    writeln!(output, "{}", format_utc_offset(timezone_offset_hours)).unwrap();

    for session in &person.sessions {
        writeln!(
            output,
            "in: {}  -  out: {} - {}",
            session.check_in,
            session.check_out,
            format_hm(session.duration())
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    for shift in &person.per_shift {
        writeln!(output, "{}: {}", shift.name, format_hm(shift.duration)).unwrap();
    }

    writeln!(output).unwrap();
    let counts: Vec<String> = AnomalyKind::ALL
        .iter()
        .map(|k| format!("{k} {}", person.anomalies.count(*k)))
        .collect();
    writeln!(output, "anomalies: {}", counts.join(", ")).unwrap();

    if !person.warnings.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "warnings:").unwrap();
        for warning in &person.warnings {
            writeln!(output, "- {warning}").unwrap();
        }
    }

    output
}

// ========== Flat Export ==========

/// One line of the `name, total, shift...` export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub name: String,
    pub total_hours: f64,
    /// In schedule order.
    pub shift_hours: Vec<f64>,
}

impl ExportRow {
    /// Cells for a CSV writer, hours with two decimals.
    pub fn to_record(&self) -> Vec<String> {
        std::iter::once(self.name.clone())
            .chain(std::iter::once(format!("{:.2}", self.total_hours)))
            .chain(self.shift_hours.iter().map(|h| format!("{h:.2}")))
            .collect()
    }
}

/// Header matching [`ExportRow::to_record`].
pub fn export_header(shift_names: &[String]) -> Vec<String> {
    ["Name".to_string(), "Time Worked (hrs)".to_string()]
        .into_iter()
        .chain(shift_names.iter().map(|n| format!("{n} (hrs)")))
        .collect()
}

// ========== Timeline ==========

/// Everything a chart renderer needs to draw sessions on a time axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub rows: Vec<TimelineRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    pub label: String,
    pub sessions: Vec<Session>,
}

// ========== Anomaly Listing ==========

/// A person with anything irregular to report.
#[derive(Debug, Clone, Serialize)]
pub struct PersonIssues<'a> {
    pub label: String,
    pub anomalies: &'a Anomalies,
    pub warnings: &'a [Warning],
}

/// Lists every anomaly record and warning, person by person.
pub fn render_issues(issues: &[PersonIssues<'_>]) -> String {
    let mut output = String::new();
    if issues.is_empty() {
        writeln!(output, "No irregular events.").unwrap();
        return output;
    }

    for (i, person) in issues.iter().enumerate() {
        if i > 0 {
            writeln!(output).unwrap();
        }
        let counts: Vec<String> = AnomalyKind::ALL
            .iter()
            .map(|k| format!("{k} {}", person.anomalies.count(*k)))
            .collect();
        writeln!(output, "{}: {}", person.label, counts.join(", ")).unwrap();
        for (kind, event) in person.anomalies.iter() {
            writeln!(
                output,
                "  {:<8} row {:<5} {}  {}",
                kind.as_str(),
                event.position,
                event.timestamp,
                event.action
            )
            .unwrap();
        }
        for warning in person.warnings {
            writeln!(output, "  warning  {warning}").unwrap();
        }
    }
    output
}

impl Timesheet {
    /// Export rows: ranked persons first, then everyone without time.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        let ranked = self.ranked();
        let idle = self
            .persons()
            .iter()
            .filter(|p| p.total <= TimeDelta::zero());
        ranked
            .into_iter()
            .chain(idle)
            .map(|p| ExportRow {
                name: p.key.label(),
                total_hours: hours(p.total),
                shift_hours: p.per_shift.iter().map(|s| hours(s.duration)).collect(),
            })
            .collect()
    }

    /// Sessions per person in ranking order, plus the span of the whole table.
    pub fn timeline(&self) -> Timeline {
        let ranked = self.ranked();
        let idle = self
            .persons()
            .iter()
            .filter(|p| p.total <= TimeDelta::zero() && !p.sessions.is_empty());
        let rows = ranked
            .into_iter()
            .chain(idle)
            .map(|p| TimelineRow {
                label: p.key.label(),
                sessions: p.sessions.clone(),
            })
            .collect();
        let (start, end) = self.span().unzip();
        Timeline { start, end, rows }
    }

    /// Persons with anomalies or warnings, in table order.
    pub fn issues(&self) -> Vec<PersonIssues<'_>> {
        self.persons()
            .iter()
            .filter(|p| !p.anomalies.is_empty() || !p.warnings.is_empty())
            .map(|p| PersonIssues {
                label: p.key.label(),
                anomalies: &p.anomalies,
                warnings: &p.warnings,
            })
            .collect()
    }
}
