//! Names command: the selections `detail` accepts.

use anyhow::Result;
use ts_core::Timesheet;

pub fn run(sheet: &Timesheet) -> Result<()> {
    for name in sheet.selectable_names() {
        println!("{name}");
    }
    Ok(())
}
