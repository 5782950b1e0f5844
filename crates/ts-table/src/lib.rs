//! Table readers for the timesheet.
//!
//! Reads attendance exports into ordered [`ts_core::Event`]s. Workbooks
//! (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) go through `calamine`; `.csv`
//! files through `csv`. Both share the same header detection and row rules:
//!
//! - The header is the first row holding `Name`, `Action` and `Time` columns.
//! - An optional id column (`StateID`, `ID`, ...) disambiguates equal names.
//! - A `UTC±HH` tag in the preamble or the `Time` header declares the zone
//!   the timestamps were written in.
//! - Rows with no name or an unreadable time are skipped and counted.

mod cell;
mod rows;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;
use ts_core::Event;

pub use cell::{Cell, parse_timestamp, parse_timestamp_in};
pub use rows::events_from_rows;

/// Sheet read from workbooks unless configured otherwise.
pub const DEFAULT_SHEET: &str = "Actions";

/// Table reading errors.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    /// The configured sheet is not in the workbook.
    #[error("sheet {sheet:?} not found; available sheets: {available}")]
    MissingSheet { sheet: String, available: String },
    /// Rows were present but none looked like a header.
    #[error("no header row with Name, Action and Time columns")]
    MissingHeader,
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
}

/// Where to find the events in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Worksheet to read from workbooks.
    pub sheet_name: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET.to_string(),
        }
    }
}

/// Events read from one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventTable {
    /// In table order.
    pub events: Vec<Event>,
    /// Zone the table says its timestamps are in.
    pub declared_offset_hours: Option<i32>,
    /// Data rows left out because they had no name or no readable time.
    pub skipped_rows: usize,
}

/// Reads a table, choosing the reader by file extension.
pub fn read_table(path: &Path, options: &TableOptions) -> Result<EventTable, TableError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(File::open(path)?),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, &options.sheet_name),
        _ => Err(TableError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Reads CSV text. Rows may have differing lengths.
pub fn read_csv<R: Read>(reader: R) -> Result<EventTable, TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::text).collect::<Vec<_>>());
    }
    events_from_rows(rows, 1)
}

/// Reads the named sheet of a workbook.
pub fn read_workbook(path: &Path, sheet: &str) -> Result<EventTable, TableError> {
    let mut workbook = open_workbook_auto(path)?;

    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == sheet) {
        return Err(TableError::MissingSheet {
            sheet: sheet.to_string(),
            available: names.join(", "),
        });
    }

    let range = workbook.worksheet_range(sheet)?;
    let first_row = range.start().map_or(0, |(row, _)| row as usize) + 1;
    let rows = range
        .rows()
        .map(|r| r.iter().map(cell_from_data).collect::<Vec<_>>());
    events_from_rows(rows, first_row)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map_or(Cell::Empty, Cell::DateTime),
        Data::Error(e) => {
            tracing::trace!(error = ?e, "treating error cell as empty");
            Cell::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use tempfile::TempDir;
    use ts_core::{Action, AnomalyKind, LoadOptions, Timesheet};

    const CSV: &str = "\
Timesheet export,,,
Zone,UTC-05:00,,
,,,
StateID,Name,Action,Time
12,Ada,Check In,2024-05-06 09:00:00
12,Ada,Check Out,2024-05-06 11:30:00
31,Bob,Check In,2024-05-06 08:00:00
31,Bob,Check Out,2024-05-06 08:00:00
";

    #[test]
    fn reads_csv_with_preamble() {
        let table = read_csv(CSV.as_bytes()).unwrap();
        assert_eq!(table.declared_offset_hours, Some(-5));
        assert_eq!(table.events.len(), 4);
        assert_eq!(table.events[0].person.label(), "Ada [#12]");
        assert_eq!(table.events[0].position, 5);
        assert_eq!(table.events[3].action, Action::CheckOut);
    }

    #[test]
    fn zoned_times_are_corrected_once() {
        let csv = "\
Zone,UTC-05:00,,
StateID,Name,Action,Time
1,A,Check In,2024-05-06T09:00:00-05:00
1,A,Check Out,2024-05-06T11:00:00-05:00
2,B,Check In,2024-05-06 09:00:00
2,B,Check Out,2024-05-06 11:00:00
";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.declared_offset_hours, Some(-5));
        assert_eq!(
            table.events[0].timestamp,
            parse_timestamp("2024-05-06 09:00:00").unwrap()
        );

        let options = LoadOptions {
            declared_offset_hours: table.declared_offset_hours,
            ..LoadOptions::default()
        };
        let sheet = Timesheet::build(&table.events, &options);
        let utc_start = parse_timestamp("2024-05-06 14:00:00").unwrap();
        for person in sheet.persons() {
            assert_eq!(person.sessions[0].check_in, utc_start, "{}", person.key);
            assert_eq!(person.total.num_hours(), 2);
        }
    }

    #[test]
    fn zoned_times_without_declared_zone_read_as_utc() {
        let csv = "\
Name,Action,Time
A,Check In,2024-05-06T09:00:00+02:00
";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.declared_offset_hours, None);
        assert_eq!(
            table.events[0].timestamp,
            parse_timestamp("2024-05-06 07:00:00").unwrap()
        );
    }

    #[test]
    fn reads_csv_file_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("actions.CSV");
        let mut file = File::create(&path).unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let table = read_table(&path, &TableOptions::default()).unwrap();
        assert_eq!(table.events.len(), 4);
    }

    #[test]
    fn empty_csv_is_empty_table() {
        let table = read_csv("".as_bytes()).unwrap();
        assert_eq!(table, EventTable::default());

        let header_only = read_csv("Name,Action,Time\n".as_bytes()).unwrap();
        assert!(header_only.events.is_empty());
    }

    #[test]
    fn unsupported_extension() {
        let err = read_table(Path::new("notes.txt"), &TableOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::UnsupportedFormat(_)));
    }

    fn write_workbook(path: &Path, sheet: &str, rows: &[&[&str]]) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet
                        .write_string(
                            u32::try_from(r).unwrap(),
                            u16::try_from(c).unwrap(),
                            *value,
                        )
                        .unwrap();
                }
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn reads_actions_sheet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.xlsx");
        write_workbook(
            &path,
            "Actions",
            &[
                &["Timesheet export"],
                &["Time zone", "UTC+02:00"],
                &[""],
                &["StateID", "Name", "Action", "Time"],
                &["5", "Cy", "Check In", "2024-05-06 22:00:00"],
                &["5", "Cy", "Check Out", "2024-05-07 01:00:00"],
            ],
        );

        let table = read_table(&path, &TableOptions::default()).unwrap();
        assert_eq!(table.declared_offset_hours, Some(2));
        assert_eq!(table.events.len(), 2);
        assert_eq!(table.events[0].person.label(), "Cy [#5]");
        assert_eq!(table.events[0].position, 5);
        assert_eq!(
            table.events[1].timestamp,
            parse_timestamp("2024-05-07 01:00:00").unwrap()
        );
    }

    #[test]
    fn reads_native_date_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.xlsx");

        let mut workbook = Workbook::new();
        let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Actions").unwrap();
        for (c, header) in ["StateID", "Name", "Action", "Time"].iter().enumerate() {
            worksheet
                .write_string(0, u16::try_from(c).unwrap(), *header)
                .unwrap();
        }
        let rows = [
            ("Check In", "2024-05-06 06:00:00", &datetime_format),
            ("Check Out", "2024-05-06 18:00:00", &datetime_format),
            ("Check In", "2024-05-07", &date_format),
        ];
        for (r, (action, time, format)) in rows.iter().enumerate() {
            let row = u32::try_from(r + 1).unwrap();
            worksheet.write_number(row, 0, 5).unwrap();
            worksheet.write_string(row, 1, "Cy").unwrap();
            worksheet.write_string(row, 2, *action).unwrap();
            let value = ExcelDateTime::parse_from_str(time).unwrap();
            worksheet
                .write_datetime_with_format(row, 3, &value, format)
                .unwrap();
        }
        workbook.save(&path).unwrap();

        let table = read_table(&path, &TableOptions::default()).unwrap();
        assert_eq!(table.skipped_rows, 0);
        let stamps: Vec<_> = table.events.iter().map(|e| e.timestamp).collect();
        assert_eq!(
            stamps,
            vec![
                parse_timestamp("2024-05-06 06:00:00").unwrap(),
                parse_timestamp("2024-05-06 18:00:00").unwrap(),
                parse_timestamp("2024-05-07 00:00:00").unwrap(),
            ]
        );
        assert_eq!(table.events[0].person.label(), "Cy [#5]");
        assert_eq!(table.events[0].position, 2);

        let sheet = Timesheet::build(&table.events, &LoadOptions::default());
        let cy = &sheet.persons()[0];
        assert_eq!(cy.total.num_hours(), 12);
        assert_eq!(cy.anomalies.count(AnomalyKind::Post), 1);
    }

    #[test]
    fn missing_sheet_names_alternatives() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.xlsx");
        write_workbook(&path, "Sheet9", &[&["Name", "Action", "Time"]]);

        let err = read_table(&path, &TableOptions::default()).unwrap_err();
        match err {
            TableError::MissingSheet { sheet, available } => {
                assert_eq!(sheet, "Actions");
                assert_eq!(available, "Sheet9");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
