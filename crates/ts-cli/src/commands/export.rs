//! Export command: per-person hours as CSV.
//!
//! Columns are `Name`, `Time Worked (hrs)` and one `<shift> (hrs)` column per
//! shift, hours with two decimals. Ranked persons come first, followed by
//! everyone without completed time.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ts_core::{Timesheet, export_header};

/// `<stem>_overview.csv` next to the input.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "timesheet".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}_overview.csv"))
}

/// Writes the export to any writer.
pub fn write_csv<W: Write>(sheet: &Timesheet, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(export_header(sheet.shift_names()))?;

    let rows = sheet.export_rows();
    for row in &rows {
        csv_writer.write_record(row.to_record())?;
    }
    csv_writer.flush()?;
    Ok(rows.len())
}

pub fn run(sheet: &Timesheet, output: &Path) -> Result<()> {
    let file = std::fs::File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let count = write_csv(sheet, file)?;
    println!("Wrote {count} rows to {}", output.display());
    Ok(())
}
