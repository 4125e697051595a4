//! JSON report of every dashboard view for one selection.

use crate::data::Selection;
use crate::stats::DashboardViews;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the data came from.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSources {
    pub hospital_csv: PathBuf,
    pub state_csv: PathBuf,
}

/// Serializable snapshot of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport<'a> {
    pub generated_by: &'static str,
    pub sources: ReportSources,
    pub group: &'static str,
    pub selection: &'a Selection,
    pub views: &'a DashboardViews,
}

impl<'a> DashboardReport<'a> {
    pub fn new(sources: ReportSources, selection: &'a Selection, views: &'a DashboardViews) -> Self {
        Self {
            generated_by: concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
            sources,
            group: selection.group.name(),
            selection,
            views,
        }
    }

    /// Serialize as pretty-printed JSON into any writer.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Write the report to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let io_err = |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)?;
        writer.flush().map_err(io_err)?;
        info!(path = %path.display(), "wrote dashboard report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BenchmarkView, Kpis, Rankings, VolumeView};
    use crate::taxonomy::MeasureGroup;

    fn empty_views() -> DashboardViews {
        DashboardViews {
            kpis: Kpis {
                hospitals: 0,
                measures: 0,
                rows: 0,
                scored_rows: 0,
                coverage: 0.0,
                average_score: None,
            },
            distribution: vec![],
            performance: vec![],
            volume: VolumeView::NotApplicable,
            state_averages: vec![],
            rankings: Rankings::default(),
            benchmark: BenchmarkView::Unavailable,
        }
    }

    #[test]
    fn test_report_json_shape() {
        let selection = Selection::for_group(MeasureGroup::HospitalWideReadmission);
        let views = empty_views();
        let report = DashboardReport::new(
            ReportSources {
                hospital_csv: "h.csv".into(),
                state_csv: "s.csv".into(),
            },
            &selection,
            &views,
        );

        let mut buf = Vec::new();
        report.write_json(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["group"], "Hospital-Wide Readmission Ratio");
        assert_eq!(value["views"]["volume"]["status"], "not_applicable");
        assert_eq!(value["views"]["benchmark"]["status"], "unavailable");
        assert!(value["views"]["kpis"]["average_score"].is_null());
        assert_eq!(value["sources"]["state_csv"], "s.csv");
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let selection = Selection::default();
        let views = empty_views();
        let report = DashboardReport::new(
            ReportSources {
                hospital_csv: "h.csv".into(),
                state_csv: "s.csv".into(),
            },
            &selection,
            &views,
        );
        report.save(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"kpis\""));
    }
}
