//! Command-line interface definitions.

use crate::data::Selection;
use crate::taxonomy::MeasureGroup;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// Unplanned Hospital Visits dashboard.
///
/// Without `--export` the desktop dashboard is opened. With `--export` the
/// views for one selection are written to a directory as JSON and PNG charts.
#[derive(Parser, Debug, Clone)]
#[command(name = "uhv-dashboard")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Hospital-level CSV file.
    #[arg(long, value_name = "FILE")]
    pub hospital_csv: Option<PathBuf>,

    /// State-level CSV file.
    #[arg(long, value_name = "FILE")]
    pub state_csv: Option<PathBuf>,

    /// Configuration file (defaults to ./uhv-dashboard.toml when present).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write report.json and chart images to this directory instead of opening a window.
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Measure group by display name.
    #[arg(long, value_name = "NAME")]
    pub group: Option<String>,

    /// Measure to include (repeatable). Defaults to the group's first measure.
    #[arg(long = "measure", value_name = "NAME")]
    pub measures: Vec<String>,

    /// State code to include (repeatable). Defaults to all states.
    #[arg(long = "state", value_name = "CODE")]
    pub states: Vec<String>,

    /// Open the export directory when done.
    #[arg(long, requires = "export")]
    pub open: bool,

    /// Write a default configuration file and exit.
    #[arg(long)]
    pub init_config: bool,

    /// Verbose logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref group) = self.group {
            if MeasureGroup::from_name(group).is_none() {
                let known: Vec<&str> = MeasureGroup::ALL.iter().map(|g| g.name()).collect();
                return Err(format!(
                    "Unknown measure group '{}'. Expected one of: {}",
                    group,
                    known.join(", ")
                ));
            }
        }
        Ok(())
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Build the export selection for `group` from `--measure`/`--state`.
    pub fn selection(&self, group: MeasureGroup) -> Selection {
        let mut selection = Selection::for_group(group);
        if !self.measures.is_empty() {
            selection.measures = self.measures.clone();
        }
        selection.states = self.states.clone();
        selection
    }
}
