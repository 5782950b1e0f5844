//! CLI subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ts_core::{LoadOptions, Timesheet, TimesheetStore};
use ts_table::{TableOptions, read_table};

pub mod anomalies;
pub mod detail;
pub mod export;
pub mod names;
pub mod overview;
pub mod timeline;

/// Reads `path` and makes its timesheet current in `store`.
///
/// The table's declared zone, if any, replaces `options.declared_offset_hours`.
pub fn load(
    store: &TimesheetStore,
    path: &Path,
    table: &TableOptions,
    options: &LoadOptions,
) -> Result<Arc<Timesheet>> {
    let events = read_table(path, table)
        .with_context(|| format!("failed to read attendance table {}", path.display()))?;

    if events.skipped_rows > 0 {
        tracing::warn!(
            skipped = events.skipped_rows,
            file = %path.display(),
            "some rows had no name or time and were skipped"
        );
    }

    let options = LoadOptions {
        declared_offset_hours: events.declared_offset_hours,
        ..options.clone()
    };
    let sheet = store.load(&events.events, &options);
    tracing::debug!(
        events = sheet.event_count(),
        persons = sheet.persons().len(),
        shift_hours = options.applied_shift_hours(),
        "loaded timesheet"
    );
    Ok(sheet)
}
