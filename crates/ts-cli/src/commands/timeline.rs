//! Timeline command: session data for an external chart renderer.

use std::path::Path;

use anyhow::{Context, Result};
use ts_core::Timesheet;

pub fn run(sheet: &Timesheet, output: Option<&Path>) -> Result<()> {
    let timeline = sheet.timeline();
    let json = serde_json::to_string_pretty(&timeline)?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Wrote timeline for {} people to {}",
                timeline.rows.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
