//! Stats module - descriptive statistics and dashboard views

mod calculator;
mod views;

pub use calculator::{BoxSummary, StatsCalculator, WHISKER_IQR};
pub use views::{
    BenchmarkEntry, BenchmarkRow, BenchmarkView, DashboardViews, Kpis, MeasureDistribution,
    PerformanceCount, RankedHospital, Rankings, ScorePoint, StateAverage, StateBenchmark,
    ViewCalculator, ViewError, VolumePoint, VolumeView, RANKING_SIZE, TOP_CONTRIBUTORS,
};
