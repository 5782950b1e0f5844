//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ts_core::{DuplicateCheckIn, parse_utc_offset};

/// Attendance timesheet.
///
/// Pairs check-in/check-out events from an attendance export into sessions,
/// splits them across shifts and reports time per person.
#[derive(Debug, Parser)]
#[command(name = "tsheet", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Report in this UTC offset (e.g. -5, +3, UTC-05:00).
    #[arg(long, global = true, allow_hyphen_values = true, value_parser = parse_utc_offset)]
    pub timezone: Option<i32>,

    /// What to do with a check-in while already checked in: keep, restart or close.
    #[arg(long, global = true)]
    pub on_duplicate: Option<DuplicateCheckIn>,

    /// Worksheet to read from workbook files.
    #[arg(long, global = true)]
    pub sheet: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show everyone with time logged, most time first.
    Overview {
        /// Attendance table (.csv, .xlsx, .xls, .ods).
        file: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the names that `detail` accepts.
    Names {
        /// Attendance table.
        file: PathBuf,
    },

    /// Show one person's sessions, shift totals and anomalies.
    Detail {
        /// Attendance table.
        file: PathBuf,

        /// A name from `names`, or "Overview".
        selection: String,
    },

    /// List irregular events and warnings per person.
    Anomalies {
        /// Attendance table.
        file: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write per-person hours as CSV.
    Export {
        /// Attendance table.
        file: PathBuf,

        /// Output path (default: <file stem>_overview.csv next to the input).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write session timeline data as JSON for charting.
    Timeline {
        /// Attendance table.
        file: PathBuf,

        /// Output path (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// The attendance table every subcommand reads.
    pub fn file(&self) -> &std::path::Path {
        match self {
            Self::Overview { file, .. }
            | Self::Names { file }
            | Self::Detail { file, .. }
            | Self::Anomalies { file, .. }
            | Self::Export { file, .. }
            | Self::Timeline { file, .. } => file,
        }
    }
}
