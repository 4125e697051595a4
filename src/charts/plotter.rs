//! Chart Plotter Module
//! Creates interactive dashboard charts and tables using egui_plot.

use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};
use std::collections::HashMap;
use uhv_dashboard::stats::{
    BenchmarkRow, MeasureDistribution, PerformanceCount, RankedHospital, StateAverage,
    StateBenchmark, VolumePoint,
};
use uhv_dashboard::taxonomy::{perf_rank, PerformanceTone, Rgba, NOT_AVAILABLE};

/// Colors for box plots, one per measure.
pub const PALETTE: [Color32; 6] = [
    Color32::from_rgb(100, 181, 246), // Blue
    Color32::from_rgb(255, 183, 77),  // Amber
    Color32::from_rgb(186, 104, 200), // Purple
    Color32::from_rgb(77, 208, 225),  // Cyan
    Color32::from_rgb(240, 98, 146),  // Pink
    Color32::from_rgb(174, 213, 129), // Light green
];

const CHART_HEIGHT: f32 = 320.0;

/// Convert a taxonomy color into an egui color.
pub fn color32(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, (color.a * 255.0).round() as u8)
}

/// Color for a "Compared to National" label; missing labels are grey.
pub fn category_color(label: Option<&str>) -> Color32 {
    color32(PerformanceTone::of(label.unwrap_or(NOT_AVAILABLE)).color())
}

/// Shorten long CMS measure names for axis ticks.
pub fn short_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut.trim_end())
    }
}

/// Creates dashboard visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Calculate beeswarm positions for points with duplicate values.
    pub fn beeswarm_positions(y_values: &[f64], center: f64, width: f64) -> Vec<f64> {
        let n = y_values.len();
        if n == 0 {
            return Vec::new();
        }

        let mut positions = vec![center; n];

        // Round values and find duplicates
        let precision = 1e3;
        let mut value_indices: HashMap<i64, Vec<usize>> = HashMap::new();

        for (i, &y) in y_values.iter().enumerate() {
            let key = (y * precision).round() as i64;
            value_indices.entry(key).or_default().push(i);
        }

        // Spread duplicates symmetrically
        for indices in value_indices.values() {
            if indices.len() > 1 {
                let count = indices.len();
                let step = width / (count.max(2) - 1) as f64;
                let start = center - width / 2.0;

                for (i, &idx) in indices.iter().enumerate() {
                    positions[idx] = start + i as f64 * step;
                }
            }
        }

        positions
    }

    /// Box plot per measure with the scored hospitals overlaid, colored by
    /// their national comparison.
    pub fn draw_distribution(ui: &mut egui::Ui, distributions: &[MeasureDistribution]) {
        let x_labels: Vec<String> = distributions
            .iter()
            .map(|d| short_label(&d.measure, 28))
            .collect();

        Plot::new("score_distribution")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Measure")
            .y_axis_label("Score")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    x_labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, dist) in distributions.iter().enumerate() {
                    let color = PALETTE[i % PALETTE.len()];
                    let s = &dist.summary;

                    let box_elem = BoxElem::new(
                        i as f64,
                        BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                    )
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.3))
                    .stroke(egui::Stroke::new(1.5, color))
                    .name(&dist.measure);
                    plot_ui.box_plot(BoxPlot::new(vec![box_elem]).name(&dist.measure));

                    for (category, scores) in dist.by_category() {
                        let xs = Self::beeswarm_positions(&scores, i as f64, 0.35);
                        let points: PlotPoints =
                            xs.iter().zip(&scores).map(|(&x, &y)| [x, y]).collect();
                        plot_ui.points(
                            Points::new(points)
                                .radius(2.5)
                                .color(category_color(category))
                                .name(category.unwrap_or(NOT_AVAILABLE)),
                        );
                    }
                }
            });
    }

    /// Stacked hospital counts per measure and national comparison.
    pub fn draw_performance(ui: &mut egui::Ui, counts: &[PerformanceCount]) {
        let mut measures: Vec<&str> = Vec::new();
        for c in counts {
            if !measures.contains(&c.measure.as_str()) {
                measures.push(&c.measure);
            }
        }
        let mut categories: Vec<&str> = counts.iter().map(|c| c.category.as_str()).collect();
        categories.sort_by_key(|c| (perf_rank(c), c.to_string()));
        categories.dedup();

        let stacks: Vec<(String, Color32, Vec<f64>)> = categories
            .iter()
            .map(|category| {
                let values = measures
                    .iter()
                    .map(|m| {
                        counts
                            .iter()
                            .find(|c| c.measure == *m && c.category == *category)
                            .map_or(0.0, |c| c.hospitals as f64)
                    })
                    .collect();
                (category.to_string(), category_color(Some(category)), values)
            })
            .collect();

        let labels = measures.iter().map(|m| short_label(m, 28)).collect();
        Self::draw_stacked_bars(ui, "performance_counts", "Hospitals", labels, stacks);
    }

    /// Patients against score, bubble radius scaled by returned patients.
    pub fn draw_volume(ui: &mut egui::Ui, points: &[VolumePoint]) {
        let max_bubble = points
            .iter()
            .map(|p| p.bubble_size)
            .fold(0.0_f64, f64::max)
            .max(1.0);

        Plot::new("volume_scatter")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label("Number of Patients")
            .y_axis_label("Score")
            .show(ui, |plot_ui| {
                for p in points {
                    let radius = 2.0 + 12.0 * (p.bubble_size / max_bubble).sqrt() as f32;
                    let category = p.compared_to_national.as_deref();
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[p.patients, p.score]]))
                            .radius(radius)
                            .color(category_color(category))
                            .name(category.unwrap_or(NOT_AVAILABLE)),
                    );
                }
            });
    }

    /// Average score per state as a bar chart, colored by rank.
    pub fn draw_state_averages(ui: &mut egui::Ui, averages: &[StateAverage]) {
        let (lo, hi) = averages.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| {
            (lo.min(a.average_score), hi.max(a.average_score))
        });
        let span = (hi - lo).max(f64::EPSILON);

        let bars: Vec<Bar> = averages
            .iter()
            .enumerate()
            .map(|(i, a)| {
                // Green for the lowest (best) averages through red for the highest.
                let t = ((a.average_score - lo) / span) as f32;
                let color = Color32::from_rgb(
                    (102.0 + t * (239.0 - 102.0)) as u8,
                    (187.0 - t * (187.0 - 83.0)) as u8,
                    (106.0 - t * (106.0 - 80.0)) as u8,
                );
                Bar::new(i as f64, a.average_score)
                    .width(0.7)
                    .fill(color)
                    .name(&a.state)
            })
            .collect();
        let labels: Vec<String> = averages.iter().map(|a| a.state.clone()).collect();

        Plot::new("state_averages")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .y_axis_label("Average Score")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Average Score"));
            });
    }

    /// Stacked benchmark counts per state for one measure.
    pub fn draw_state_benchmark(ui: &mut egui::Ui, bench: &StateBenchmark, measure: &str) {
        let mut rows: Vec<&BenchmarkRow> = bench
            .rows
            .iter()
            .filter(|r| r.measure.as_deref() == Some(measure))
            .collect();
        rows.sort_by(|a, b| a.state.cmp(&b.state));

        let mut counters = bench.config.counters.to_vec();
        counters.sort_by_key(|c| c.legend_rank());

        let stacks = counters
            .iter()
            .map(|counter| {
                let values = rows
                    .iter()
                    .map(|r| r.count(*counter).unwrap_or(0) as f64)
                    .collect::<Vec<f64>>();
                (counter.label().to_string(), color32(counter.tone().color()), values)
            })
            .collect();
        let labels = rows
            .iter()
            .map(|r| r.state.clone().unwrap_or_default())
            .collect();

        Self::draw_stacked_bars(
            ui,
            &format!("state_benchmark_{measure}"),
            "Number of Hospitals",
            labels,
            stacks,
        );
    }

    fn draw_stacked_bars(
        ui: &mut egui::Ui,
        id: &str,
        y_label: &str,
        labels: Vec<String>,
        stacks: Vec<(String, Color32, Vec<f64>)>,
    ) {
        let mut charts: Vec<BarChart> = Vec::with_capacity(stacks.len());
        for (name, color, values) in stacks {
            let bars = values
                .iter()
                .enumerate()
                .map(|(i, v)| Bar::new(i as f64, *v).width(0.6))
                .collect();
            let below: Vec<&BarChart> = charts.iter().collect();
            let chart = BarChart::new(bars).name(name).color(color).stack_on(&below);
            charts.push(chart);
        }

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .y_axis_label(y_label)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    /// Facility / state / score table for the ranking tab.
    pub fn draw_ranking_table(ui: &mut egui::Ui, id: &str, rows: &[RankedHospital]) {
        Self::table_frame(ui, |ui| {
            egui::Grid::new(ui.make_persistent_id(id))
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    header(ui, &["Facility Name", "State", "Score"]);
                    for row in rows {
                        ui.label(row.facility_name.as_deref().unwrap_or("-"));
                        ui.label(row.state.as_deref().unwrap_or("-"));
                        ui.label(format!("{:.2}", row.score));
                        ui.end_row();
                    }
                });
        });
    }

    /// High-volume contributor table.
    pub fn draw_contributor_table(ui: &mut egui::Ui, rows: &[VolumePoint]) {
        Self::table_frame(ui, |ui| {
            egui::Grid::new(ui.make_persistent_id("top_contributors"))
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    header(ui, &["Facility Name", "State", "Number of Patients", "Score"]);
                    for row in rows {
                        ui.label(row.facility_name.as_deref().unwrap_or("-"));
                        ui.label(row.state.as_deref().unwrap_or("-"));
                        ui.label(format!("{:.0}", row.patients));
                        ui.label(format!("{:.2}", row.score));
                        ui.end_row();
                    }
                });
        });
    }

    /// State averages, highest first.
    pub fn draw_state_table(ui: &mut egui::Ui, averages: &[StateAverage]) {
        Self::table_frame(ui, |ui| {
            egui::Grid::new(ui.make_persistent_id("state_average_table"))
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    header(ui, &["State", "Average Score", "Rows"]);
                    for a in averages {
                        ui.label(a.state.as_str());
                        ui.label(format!("{:.3}", a.average_score));
                        ui.label(a.rows.to_string());
                        ui.end_row();
                    }
                });
        });
    }

    /// Wide benchmark table in its configured sort order.
    pub fn draw_benchmark_table(ui: &mut egui::Ui, bench: &StateBenchmark) {
        Self::table_frame(ui, |ui| {
            egui::Grid::new(ui.make_persistent_id("benchmark_table"))
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("State").strong());
                    ui.label(RichText::new("Measure Name").strong());
                    for counter in bench.config.counters {
                        ui.label(RichText::new(counter.column()).strong());
                    }
                    ui.end_row();

                    for row in &bench.rows {
                        ui.label(row.state.as_deref().unwrap_or("-"));
                        ui.label(short_label(row.measure.as_deref().unwrap_or("-"), 48));
                        for (_, count) in &row.counts {
                            ui.label(count.map_or_else(|| "-".to_string(), |n| n.to_string()));
                        }
                        ui.end_row();
                    }
                });
        });
    }

    fn table_frame(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, add_contents);
    }
}

fn header(ui: &mut egui::Ui, titles: &[&str]) {
    for title in titles {
        ui.label(RichText::new(*title).strong());
    }
    ui.end_row();
}
