//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use ts_core::shift::{DEFAULT_BOUNDARIES, DEFAULT_SHIFT_NAMES};
use ts_core::{DuplicateCheckIn, LoadOptions, Shift, ShiftError, ShiftSchedule};
use ts_table::{DEFAULT_SHEET, TableOptions};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// UTC offset the timesheet is reported in, in whole hours.
    pub timezone_offset_hours: i32,
    /// Worksheet read from workbook files.
    pub sheet_name: String,
    pub duplicate_check_in: DuplicateCheckIn,
    pub shifts: ShiftConfig,
}

/// Shift schedule settings.
///
/// `custom` lists explicit windows per shift and, when non-empty, replaces
/// the cyclic `boundaries`/`names` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftConfig {
    pub boundaries: Vec<i32>,
    pub names: Vec<String>,
    #[serde(default)]
    pub custom: Vec<Shift>,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_BOUNDARIES.to_vec(),
            names: DEFAULT_SHIFT_NAMES.iter().map(ToString::to_string).collect(),
            custom: Vec::new(),
        }
    }
}

impl ShiftConfig {
    pub fn schedule(&self) -> Result<ShiftSchedule, ShiftError> {
        if self.custom.is_empty() {
            ShiftSchedule::from_boundaries(&self.boundaries, &self.names)
        } else {
            ShiftSchedule::new(self.custom.clone())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone_offset_hours: 0,
            sheet_name: DEFAULT_SHEET.to_string(),
            duplicate_check_in: DuplicateCheckIn::default(),
            shifts: ShiftConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // TSHEET_TIMEZONE_OFFSET_HOURS, TSHEET_SHIFTS__NAMES, ...
        figment = figment.merge(Env::prefixed("TSHEET_").split("__"));

        figment.extract()
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            sheet_name: self.sheet_name.clone(),
        }
    }

    /// Load options for a table that declares no zone of its own.
    pub fn load_options(&self) -> Result<LoadOptions, ShiftError> {
        Ok(LoadOptions {
            timezone_offset_hours: self.timezone_offset_hours,
            declared_offset_hours: None,
            duplicate_check_in: self.duplicate_check_in,
            schedule: self.shifts.schedule()?,
        })
    }
}

/// Returns the platform-specific config directory for tsheet.
///
/// On Linux: `~/.config/tsheet`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tsheet"))
}
