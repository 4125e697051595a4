//! Chart Viewer Widget
//! Central panel with the KPI row and one tab per dashboard view.

use crate::charts::{short_label, ChartPlotter};
use egui::{Color32, RichText, ScrollArea};
use uhv_dashboard::stats::{BenchmarkView, DashboardViews, Kpis, VolumeView};

const CARD_WIDTH: f32 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Performance,
    Volume,
    Geography,
    Rankings,
    StateBenchmark,
}

impl DashboardTab {
    const ALL: [DashboardTab; 5] = [
        DashboardTab::Performance,
        DashboardTab::Volume,
        DashboardTab::Geography,
        DashboardTab::Rankings,
        DashboardTab::StateBenchmark,
    ];

    fn title(self) -> &'static str {
        match self {
            DashboardTab::Performance => "📊 Performance",
            DashboardTab::Volume => "👥 Volume",
            DashboardTab::Geography => "🗺 Geography",
            DashboardTab::Rankings => "🏆 Rankings",
            DashboardTab::StateBenchmark => "📐 State Benchmark",
        }
    }
}

/// Scrollable view of the current dashboard.
#[derive(Default)]
pub struct ChartViewer {
    views: Option<DashboardViews>,
    tab: DashboardTab,
    /// Measure shown in the benchmark tab.
    benchmark_measure: usize,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.views = None;
    }

    pub fn set_views(&mut self, views: DashboardViews) {
        self.views = Some(views);
        self.benchmark_measure = 0;
    }

    pub fn views(&self) -> Option<&DashboardViews> {
        self.views.as_ref()
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(views) = self.views.as_ref() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        Self::draw_kpis(ui, &views.kpis);
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            for tab in DashboardTab::ALL {
                ui.selectable_value(&mut self.tab, tab, RichText::new(tab.title()).size(14.0));
            }
        });
        ui.separator();

        let tab = self.tab;
        let mut benchmark_measure = self.benchmark_measure;
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match tab {
                DashboardTab::Performance => Self::draw_performance(ui, views),
                DashboardTab::Volume => Self::draw_volume(ui, &views.volume),
                DashboardTab::Geography => Self::draw_geography(ui, views),
                DashboardTab::Rankings => Self::draw_rankings(ui, views),
                DashboardTab::StateBenchmark => {
                    Self::draw_benchmark(ui, &views.benchmark, &mut benchmark_measure)
                }
            });
        self.benchmark_measure = benchmark_measure;
    }

    fn draw_kpis(ui: &mut egui::Ui, kpis: &Kpis) {
        let average = kpis
            .average_score
            .map_or_else(|| "N/A".to_string(), |s| format!("{s:.2}"));
        let cards = [
            ("Hospitals", kpis.hospitals.to_string()),
            ("Measures", kpis.measures.to_string()),
            ("Score Coverage", format!("{:.1}%", kpis.coverage * 100.0)),
            ("Average Score", average),
        ];

        ui.horizontal(|ui| {
            for (title, value) in cards {
                egui::Frame::none()
                    .rounding(8.0)
                    .stroke(egui::Stroke::new(1.0, Color32::from_rgb(100, 149, 237)))
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(10.0)
                    .show(ui, |ui| {
                        ui.set_width(CARD_WIDTH);
                        ui.vertical(|ui| {
                            ui.label(RichText::new(title).size(12.0).color(Color32::GRAY));
                            ui.label(RichText::new(value).size(22.0).strong());
                        });
                    });
                ui.add_space(10.0);
            }
        });
    }

    fn draw_performance(ui: &mut egui::Ui, views: &DashboardViews) {
        section(ui, "Score Distribution");
        if views.distribution.is_empty() {
            empty(ui, "No scored rows for this selection");
        } else {
            ChartPlotter::draw_distribution(ui, &views.distribution);
        }

        ui.add_space(15.0);
        section(ui, "Hospitals by National Comparison");
        if views.performance.is_empty() {
            empty(ui, "No rows for this selection");
        } else {
            ChartPlotter::draw_performance(ui, &views.performance);
        }
    }

    fn draw_volume(ui: &mut egui::Ui, volume: &VolumeView) {
        match volume {
            VolumeView::NotApplicable => {
                empty(ui, "Volume data is only reported for EDAC measures");
            }
            VolumeView::Available {
                points,
                top_contributors,
            } => {
                section(ui, "Patients vs. Score");
                if points.is_empty() {
                    empty(ui, "No rows with both a patient count and a score");
                    return;
                }
                ChartPlotter::draw_volume(ui, points);
                ui.add_space(15.0);
                section(ui, "Top Contributors");
                ChartPlotter::draw_contributor_table(ui, top_contributors);
            }
        }
    }

    fn draw_geography(ui: &mut egui::Ui, views: &DashboardViews) {
        section(ui, "Average Score by State");
        if views.state_averages.is_empty() {
            empty(ui, "No scored rows for this selection");
            return;
        }
        ChartPlotter::draw_state_averages(ui, &views.state_averages);
        ui.add_space(15.0);
        ChartPlotter::draw_state_table(ui, &views.state_averages);
    }

    fn draw_rankings(ui: &mut egui::Ui, views: &DashboardViews) {
        let rankings = &views.rankings;
        if rankings.lowest_performing.is_empty() && rankings.best_performing.is_empty() {
            empty(ui, "No scored rows for this selection");
            return;
        }
        ui.columns(2, |columns| {
            section(&mut columns[0], "Highest Scores (Lowest Performing)");
            ChartPlotter::draw_ranking_table(
                &mut columns[0],
                "lowest_performing",
                &rankings.lowest_performing,
            );
            section(&mut columns[1], "Lowest Scores (Best Performing)");
            ChartPlotter::draw_ranking_table(
                &mut columns[1],
                "best_performing",
                &rankings.best_performing,
            );
        });
    }

    fn draw_benchmark(ui: &mut egui::Ui, benchmark: &BenchmarkView, measure_idx: &mut usize) {
        let bench = match benchmark {
            BenchmarkView::Unavailable => {
                empty(ui, "No state benchmark for this measure group");
                return;
            }
            BenchmarkView::Available(bench) if bench.rows.is_empty() => {
                empty(ui, "No state rows for this selection");
                return;
            }
            BenchmarkView::Available(bench) => bench,
        };

        let mut measures: Vec<&str> = Vec::new();
        for row in &bench.rows {
            if let Some(m) = row.measure.as_deref() {
                if !measures.contains(&m) {
                    measures.push(m);
                }
            }
        }
        measures.sort_unstable();

        if !measures.is_empty() {
            *measure_idx = (*measure_idx).min(measures.len() - 1);
            section(ui, "Hospitals per State");
            egui::ComboBox::from_id_salt("benchmark_measure")
                .width(420.0)
                .selected_text(short_label(measures[*measure_idx], 60))
                .show_ui(ui, |ui| {
                    for (i, m) in measures.iter().enumerate() {
                        ui.selectable_value(measure_idx, i, *m);
                    }
                });
            ChartPlotter::draw_state_benchmark(ui, bench, measures[*measure_idx]);
        }

        ui.add_space(15.0);
        section(ui, "Benchmark Table");
        ChartPlotter::draw_benchmark_table(ui, bench);
    }
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.label(RichText::new(title).size(16.0).strong());
    ui.add_space(5.0);
}

fn empty(ui: &mut egui::Ui, message: &str) {
    ui.add_space(20.0);
    ui.label(RichText::new(message).size(14.0).color(Color32::GRAY));
}
