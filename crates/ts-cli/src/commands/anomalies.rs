//! Anomalies command: irregular events and warnings per person.

use anyhow::Result;
use ts_core::Timesheet;
use ts_core::report::render_issues;

pub fn run(sheet: &Timesheet, json: bool) -> Result<()> {
    let issues = sheet.issues();
    if json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
    } else {
        print!("{}", render_issues(&issues));
    }
    Ok(())
}
