//! Overview command: everyone with time logged, most time first.

use anyhow::Result;
use ts_core::Timesheet;

/// Formats the overview, with a hint when nobody has completed a session.
pub fn format_overview(sheet: &Timesheet) -> String {
    let text = sheet.overview_text();
    if text.is_empty() {
        "No completed sessions.\n".to_string()
    } else {
        text
    }
}

pub fn run(sheet: &Timesheet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&sheet.overview())?);
    } else {
        print!("{}", format_overview(sheet));
    }
    Ok(())
}
