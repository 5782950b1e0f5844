//! Holder for the most recently loaded timesheet.
//!
//! A load builds the new [`Timesheet`] completely before taking the write
//! lock, then swaps it in. Readers get an `Arc` to whichever result was
//! current, so they never observe a half-built load and a reload never
//! mixes with the previous one.

use std::sync::{Arc, PoisonError, RwLock};

use crate::event::Event;
use crate::timesheet::{LoadOptions, Timesheet};

#[derive(Debug, Default)]
pub struct TimesheetStore {
    current: RwLock<Arc<Timesheet>>,
}

impl TimesheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a timesheet from `events` and makes it current, replacing
    /// everything from the previous load.
    pub fn load(&self, events: &[Event], options: &LoadOptions) -> Arc<Timesheet> {
        let sheet = Arc::new(Timesheet::build(events, options));
        self.replace(Arc::clone(&sheet));
        sheet
    }

    /// Makes `sheet` current.
    pub fn replace(&self, sheet: Arc<Timesheet>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = sheet;
    }

    /// The current result.
    pub fn snapshot(&self) -> Arc<Timesheet> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}
