//! Static Chart Renderer
//! Writes the exported dashboard charts as PNG files using plotters.
//!
//! Every exported chart is a (possibly stacked) bar chart:
//! - `performance.png`: hospitals per measure, stacked by national comparison
//! - `state_averages.png`: average score per state
//! - `state_benchmark.png`: benchmark counters per state and measure

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use uhv_dashboard::stats::{PerformanceCount, StateAverage, StateBenchmark};
use uhv_dashboard::taxonomy::{perf_rank, PerformanceTone, Rgba};

const CHART_SIZE: (u32, u32) = (1400, 900);
const BAR_MARGIN: u32 = 6;

const AVERAGE_COLOR: Rgba = Rgba::new(33, 150, 243, 1.0);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),
    #[error("No data to draw for {0}")]
    Empty(&'static str),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// One stacked layer of a bar chart.
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub name: String,
    pub color: Rgba,
    /// One value per x label.
    pub values: Vec<f64>,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Hospitals per measure, stacked by "Compared to National" category.
    pub fn render_performance(path: &Path, counts: &[PerformanceCount]) -> Result<(), RenderError> {
        let mut measures: Vec<&str> = Vec::new();
        for c in counts {
            if !measures.contains(&c.measure.as_str()) {
                measures.push(&c.measure);
            }
        }
        let mut categories: Vec<&str> = counts.iter().map(|c| c.category.as_str()).collect();
        categories.sort_by_key(|c| (perf_rank(c), c.to_string()));
        categories.dedup();

        let series: Vec<BarSeries> = categories
            .iter()
            .map(|category| BarSeries {
                name: category.to_string(),
                color: PerformanceTone::of(category).color(),
                values: measures
                    .iter()
                    .map(|m| {
                        counts
                            .iter()
                            .find(|c| c.measure == *m && c.category == *category)
                            .map_or(0.0, |c| c.hospitals as f64)
                    })
                    .collect(),
            })
            .collect();
        let labels: Vec<String> = measures.iter().map(|m| abbreviate(m, 32)).collect();

        Self::render_stacked_bars(
            path,
            "Hospital Performance by Measure",
            "Number of Hospitals",
            &labels,
            &series,
        )
    }

    /// Average score per state, highest first.
    pub fn render_state_averages(
        path: &Path,
        averages: &[StateAverage],
    ) -> Result<(), RenderError> {
        let labels: Vec<String> = averages.iter().map(|a| a.state.clone()).collect();
        let series = [BarSeries {
            name: "Average Score".to_string(),
            color: AVERAGE_COLOR,
            values: averages.iter().map(|a| a.average_score).collect(),
        }];
        Self::render_stacked_bars(path, "Average Score by State", "Average Score", &labels, &series)
    }

    /// Benchmark counters per (state, measure) row in table order.
    pub fn render_state_benchmark(path: &Path, bench: &StateBenchmark) -> Result<(), RenderError> {
        let mut measures: Vec<&str> = Vec::new();
        for row in &bench.rows {
            if let Some(m) = row.measure.as_deref() {
                if !measures.contains(&m) {
                    measures.push(m);
                }
            }
        }

        let labels: Vec<String> = bench
            .rows
            .iter()
            .map(|row| {
                let state = row.state.as_deref().unwrap_or("?");
                if measures.len() > 1 {
                    let idx = row
                        .measure
                        .as_deref()
                        .and_then(|m| measures.iter().position(|x| *x == m))
                        .map_or(0, |i| i + 1);
                    format!("{state} #{idx}")
                } else {
                    state.to_string()
                }
            })
            .collect();

        let mut counters = bench.config.counters.to_vec();
        counters.sort_by_key(|c| c.legend_rank());
        let series: Vec<BarSeries> = counters
            .iter()
            .map(|counter| BarSeries {
                name: counter.label().to_string(),
                color: counter.tone().color(),
                values: bench
                    .rows
                    .iter()
                    .map(|r| r.count(*counter).unwrap_or(0) as f64)
                    .collect(),
            })
            .collect();

        Self::render_stacked_bars(
            path,
            &format!("State Benchmark: {}", bench.config.group),
            "Number of Hospitals",
            &labels,
            &series,
        )
    }

    /// Draw `series` stacked bottom to top over one bar per label.
    pub fn render_stacked_bars(
        path: &Path,
        title: &str,
        y_desc: &str,
        labels: &[String],
        series: &[BarSeries],
    ) -> Result<(), RenderError> {
        if labels.is_empty() || series.is_empty() {
            return Err(RenderError::Empty("chart"));
        }

        let totals: Vec<f64> = (0..labels.len())
            .map(|i| {
                series
                    .iter()
                    .map(|s| s.values.get(i).copied().unwrap_or(0.0).max(0.0))
                    .sum()
            })
            .collect();
        let y_max = totals.iter().copied().fold(0.0_f64, f64::max).max(1.0) * 1.1;

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(160)
            .y_label_area_size(70)
            .build_cartesian_2d((0..labels.len()).into_segmented(), 0f64..y_max)
            .map_err(draw_err)?;

        let x_formatter = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&x_formatter)
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc(y_desc)
            .draw()
            .map_err(draw_err)?;

        let mut base = vec![0.0_f64; labels.len()];
        for s in series {
            let color = RGBAColor(s.color.r, s.color.g, s.color.b, f64::from(s.color.a));
            let mut bars = Vec::new();
            for (i, value) in s.values.iter().enumerate().take(labels.len()) {
                if *value <= 0.0 {
                    continue;
                }
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), base[i]),
                        (SegmentValue::Exact(i + 1), base[i] + value),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, BAR_MARGIN, BAR_MARGIN);
                base[i] += value;
                bars.push(bar);
            }

            chart
                .draw_series(bars)
                .map_err(draw_err)?
                .label(s.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

fn abbreviate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("Heart Attack", 32), "Heart Attack");
        assert_eq!(abbreviate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_empty_chart_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let result = StaticChartRenderer::render_performance(&path, &[]);
        assert!(matches!(result, Err(RenderError::Empty(_))));
        assert!(!path.exists());
    }
}
