//! Turns raw table rows into events.
//!
//! Exports carry a few preamble rows (title, export time, zone) above the
//! real header, so the header is found by content rather than position.

use ts_core::{Action, Event, PersonKey, find_utc_offset};

use crate::cell::Cell;
use crate::{EventTable, TableError};

/// Normalized header names accepted for the secondary id column.
const ID_HEADERS: &[&str] = &["stateid", "id", "personid", "employeeid", "userid"];

/// Column positions found in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    name: usize,
    action: usize,
    time: usize,
    id: Option<usize>,
}

/// Lowercases and drops everything but letters and digits.
fn normalize_header(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Recognizes a header row. `Time` may carry a suffix such as `Time (UTC-05)`.
fn detect_columns(row: &[Cell]) -> Option<Columns> {
    let headers: Vec<String> = row
        .iter()
        .map(|c| c.as_text().map(|t| normalize_header(&t)).unwrap_or_default())
        .collect();

    let find = |pred: &dyn Fn(&str) -> bool| headers.iter().position(|h| pred(h));
    let name = find(&|h| h == "name")?;
    let action = find(&|h| h == "action")?;
    let time = find(&|h| h.starts_with("time"))?;
    let id = find(&|h| ID_HEADERS.contains(&h));

    Some(Columns {
        name,
        action,
        time,
        id,
    })
}

static EMPTY: Cell = Cell::Empty;

fn cell(row: &[Cell], index: usize) -> &Cell {
    row.get(index).unwrap_or(&EMPTY)
}

/// Builds an [`EventTable`] from rows.
///
/// `first_row` is the 1-based row number of the first item, used for event
/// positions. An empty input yields an empty table; rows without a
/// recognizable header are an error.
pub fn events_from_rows<I>(rows: I, first_row: usize) -> Result<EventTable, TableError>
where
    I: IntoIterator<Item = Vec<Cell>>,
{
    let mut rows = rows.into_iter().enumerate();
    let mut declared_offset_hours = None;
    let mut saw_rows = false;

    let columns = loop {
        let Some((_, row)) = rows.next() else {
            if saw_rows {
                return Err(TableError::MissingHeader);
            }
            return Ok(EventTable::default());
        };
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        saw_rows = true;

        if let Some(columns) = detect_columns(&row) {
            if let Some(hours) = cell(&row, columns.time)
                .as_text()
                .and_then(|t| find_utc_offset(&t))
            {
                declared_offset_hours = Some(hours);
            }
            break columns;
        }

        if declared_offset_hours.is_none() {
            declared_offset_hours = row
                .iter()
                .filter_map(Cell::as_text)
                .find_map(|t| find_utc_offset(&t));
        }
    };

    // Zoned `Time` values are read into the declared zone.
    let zone_hours = declared_offset_hours.unwrap_or(0);

    let mut table = EventTable {
        declared_offset_hours,
        ..EventTable::default()
    };

    for (index, row) in rows {
        let position = first_row + index;
        if row.iter().all(Cell::is_empty) {
            continue;
        }

        let Some(name) = cell(&row, columns.name).as_text() else {
            tracing::warn!(row = position, "skipping row without a name");
            table.skipped_rows += 1;
            continue;
        };
        let Some(timestamp) = cell(&row, columns.time).as_timestamp(zone_hours) else {
            tracing::warn!(row = position, name = %name, "skipping row with unreadable time");
            table.skipped_rows += 1;
            continue;
        };
        let id = columns.id.and_then(|i| cell(&row, i).as_text());
        let person = match PersonKey::new(name, id) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(row = position, error = %e, "skipping row");
                table.skipped_rows += 1;
                continue;
            }
        };
        let label = cell(&row, columns.action).as_text().unwrap_or_default();

        table.events.push(Event::new(
            person,
            Action::from_label(&label),
            timestamp,
            position,
        ));
    }

    tracing::debug!(
        events = table.events.len(),
        skipped = table.skipped_rows,
        declared_offset_hours = ?table.declared_offset_hours,
        "read event table"
    );
    Ok(table)
}
