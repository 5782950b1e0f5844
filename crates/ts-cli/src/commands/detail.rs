//! Detail command: one person's breakdown, or the overview.

use anyhow::{Result, bail};
use ts_core::{QueryError, Selection, Timesheet};

use super::overview::format_overview;

/// The text for `selection`; `Overview` prints exactly what `overview` does.
pub fn format_detail(sheet: &Timesheet, selection: &str) -> Result<String> {
    match sheet.selection(selection) {
        Ok(Selection::Overview) => Ok(format_overview(sheet)),
        Ok(person) => Ok(sheet.detail(&person)?),
        Err(e @ QueryError::NotFound(_)) => {
            bail!("{e}; choose one of: {}", sheet.selectable_names().join(", "))
        }
    }
}

pub fn run(sheet: &Timesheet, selection: &str) -> Result<()> {
    print!("{}", format_detail(sheet, selection)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ts_core::{Action, Event, LoadOptions, PersonKey};

    fn sheet() -> Timesheet {
        let at = |hour| {
            NaiveDate::from_ymd_opt(2025, 3, 3)
                .and_then(|d| d.and_hms_opt(hour, 0, 0))
                .unwrap()
        };
        let key = PersonKey::new("Ada", Some("7".into())).unwrap();
        let events = vec![
            Event::new(key.clone(), Action::CheckIn, at(9), 2),
            Event::new(key, Action::CheckOut, at(10), 3),
        ];
        Timesheet::build(&events, &LoadOptions::default())
    }

    #[test]
    fn test_detail_by_label() {
        let text = format_detail(&sheet(), "Ada [#7]").unwrap();
        assert!(text.starts_with("Ada [#7] - clocked time: 1h 00m\n"));
    }

    #[test]
    fn test_overview_selection() {
        let sheet = sheet();
        assert_eq!(
            format_detail(&sheet, "Overview").unwrap(),
            sheet.overview_text()
        );
    }

    #[test]
    fn test_overview_selection_on_empty_table() {
        let empty = Timesheet::build(&[], &LoadOptions::default());
        assert_eq!(
            format_detail(&empty, "Overview").unwrap(),
            format_overview(&empty)
        );
        assert_eq!(
            format_detail(&empty, "Overview").unwrap(),
            "No completed sessions.\n"
        );
    }

    #[test]
    fn test_unknown_selection_lists_choices() {
        let err = format_detail(&sheet(), "Ada").unwrap_err();
        assert_eq!(
            err.to_string(),
            "no person matches \"Ada\"; choose one of: Overview, Ada [#7]"
        );
    }
}
