//! Core domain logic for attendance timesheets.
//!
//! This crate contains the fundamental types and logic for:
//! - Reconciliation: pairing check-in/check-out events into sessions
//! - Shift apportioning: splitting session time across daily shift windows
//! - Aggregation: per-person totals, ranking and the text/export views

pub mod event;
pub mod offset;
pub mod reconcile;
pub mod report;
pub mod shift;
mod store;
mod timesheet;
pub mod types;

pub use event::{Action, Event};
pub use offset::{OffsetError, find_utc_offset, format_utc_offset, parse_utc_offset};
pub use reconcile::{
    Anomalies, AnomalyKind, DuplicateCheckIn, Reconciliation, Session, UnknownPolicy, Warning,
    reconcile,
};
pub use report::{ExportRow, PersonIssues, Timeline, TimelineRow, export_header, format_hm};
pub use shift::{Apportionment, Shift, ShiftError, ShiftSchedule, ShiftWindow};
pub use store::TimesheetStore;
pub use timesheet::{
    LoadOptions, OVERVIEW_LABEL, OverviewEntry, PersonSummary, QueryError, Selection, ShiftTotal,
    Timesheet,
};
pub use types::{PersonKey, ValidationError};
