//! Dashboard export: report JSON plus PNG charts in one directory.

use crate::charts::StaticChartRenderer;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uhv_dashboard::report::{DashboardReport, ReportSources};
use uhv_dashboard::stats::{BenchmarkView, DashboardViews};
use uhv_dashboard::Selection;

pub const REPORT_FILE: &str = "report.json";
pub const PERFORMANCE_CHART: &str = "performance.png";
pub const STATE_AVERAGES_CHART: &str = "state_averages.png";
pub const STATE_BENCHMARK_CHART: &str = "state_benchmark.png";

/// Write the report and every chart that has data. Returns the files written.
///
/// A chart that fails to render is logged and skipped; the report itself
/// must be written.
pub fn export_dashboard(
    dir: &Path,
    sources: ReportSources,
    selection: &Selection,
    views: &DashboardViews,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let mut written = Vec::new();

    let report_path = dir.join(REPORT_FILE);
    DashboardReport::new(sources, selection, views)
        .save(&report_path)
        .context("Failed to write dashboard report")?;
    written.push(report_path);

    let performance = dir.join(PERFORMANCE_CHART);
    record(
        StaticChartRenderer::render_performance(&performance, &views.performance),
        performance,
        &mut written,
    );

    let averages = dir.join(STATE_AVERAGES_CHART);
    record(
        StaticChartRenderer::render_state_averages(&averages, &views.state_averages),
        averages,
        &mut written,
    );

    if let BenchmarkView::Available(ref bench) = views.benchmark {
        let path = dir.join(STATE_BENCHMARK_CHART);
        record(
            StaticChartRenderer::render_state_benchmark(&path, bench),
            path,
            &mut written,
        );
    }

    info!(dir = %dir.display(), files = written.len(), "Export complete");
    Ok(written)
}

fn record<E: std::fmt::Display>(
    result: std::result::Result<(), E>,
    path: PathBuf,
    written: &mut Vec<PathBuf>,
) {
    match result {
        Ok(()) => written.push(path),
        Err(e) => warn!(chart = %path.display(), "Skipped chart: {}", e),
    }
}
