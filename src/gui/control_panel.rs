//! Control Panel Widget
//! Left side panel with data sources and the measure/state filters.

use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::{Path, PathBuf};
use uhv_dashboard::{MeasureGroup, Selection};

/// Left side control panel with file selection and filter controls.
pub struct ControlPanel {
    pub hospital_csv: PathBuf,
    pub state_csv: PathBuf,
    pub selection: Selection,
    /// States present in the loaded hospital table.
    pub states: Vec<String>,
    pub status: String,
    pub loaded: bool,
}

impl ControlPanel {
    pub fn new(hospital_csv: PathBuf, state_csv: PathBuf, group: MeasureGroup) -> Self {
        Self {
            hospital_csv,
            state_csv,
            selection: Selection::for_group(group),
            states: Vec::new(),
            status: "Ready".to_string(),
            loaded: false,
        }
    }

    /// Replace the state list after a load. All states stay selected.
    pub fn update_states(&mut self, states: Vec<String>) {
        self.states = states;
        self.selection.states.clear();
        self.loaded = true;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏥 Unplanned Hospital Visits")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("CMS Hospital Compare").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Sources =====
        ui.label(RichText::new("📁 Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                if source_row(ui, "Hospital", &self.hospital_csv) {
                    action = ControlPanelAction::BrowseHospitalCsv;
                }
                if source_row(ui, "State", &self.state_csv) {
                    action = ControlPanelAction::BrowseStateCsv;
                }
                ui.add_space(4.0);
                if ui.button("▶ Load").clicked() {
                    action = ControlPanelAction::Load;
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Measure Group =====
        ui.label(RichText::new("🔧 Measure Group").size(14.0).strong());
        ui.add_space(5.0);

        let current = self.selection.group;
        ComboBox::from_id_salt("measure_group")
            .width(ui.available_width() - 10.0)
            .selected_text(current.name())
            .show_ui(ui, |ui| {
                for group in MeasureGroup::ALL {
                    if ui.selectable_label(current == group, group.name()).clicked() && current != group {
                        self.selection.change_group(group);
                        action = ControlPanelAction::SelectionChanged;
                    }
                }
            });

        ui.add_space(10.0);

        // ===== Measures =====
        ui.label(RichText::new("📋 Measures").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("measures")
                    .max_height(180.0)
                    .show(ui, |ui| {
                        for measure in self.selection.group.measures() {
                            let mut checked = self.selection.measures.iter().any(|m| m == measure);
                            if ui.checkbox(&mut checked, *measure).changed() {
                                toggle(&mut self.selection.measures, measure, checked);
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });
            });

        ui.add_space(10.0);

        // ===== States =====
        ui.horizontal(|ui| {
            ui.label(RichText::new("🗺 States").size(14.0).strong());
            let summary = if self.selection.states.is_empty() {
                "all".to_string()
            } else {
                format!("{} selected", self.selection.states.len())
            };
            ui.label(RichText::new(summary).size(11.0).color(Color32::GRAY));
        });
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("states")
                    .max_height(180.0)
                    .show(ui, |ui| {
                        ui.horizontal_wrapped(|ui| {
                            for state in &self.states {
                                let mut checked = self.selection.states.contains(state);
                                if ui.checkbox(&mut checked, state.as_str()).changed() {
                                    toggle(&mut self.selection.states, state, checked);
                                    action = ControlPanelAction::SelectionChanged;
                                }
                            }
                        });
                    });
            });

        ui.add_space(5.0);
        if ui.small_button("Clear (all states)").clicked() && !self.selection.states.is_empty() {
            self.selection.states.clear();
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.loaded, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export Report").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Export;
                }
            });
        });

        ui.add_space(10.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.loaded {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

fn source_row(ui: &mut egui::Ui, label: &str, path: &Path) -> bool {
    let mut clicked = false;
    ui.horizontal(|ui| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "No file selected".to_string());
        ui.label(RichText::new(format!("{label}:")).size(12.0).strong());
        ui.label(RichText::new(name).size(12.0)).on_hover_text(path.display().to_string());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            clicked = ui.button("📂 Browse").clicked();
        });
    });
    clicked
}

/// Add or remove `item` keeping the list free of duplicates.
fn toggle(list: &mut Vec<String>, item: &str, on: bool) {
    if on {
        if !list.iter().any(|x| x == item) {
            list.push(item.to_string());
        }
    } else {
        list.retain(|x| x != item);
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseHospitalCsv,
    BrowseStateCsv,
    Load,
    SelectionChanged,
    Export,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut list = vec!["CA".to_string()];
        toggle(&mut list, "TX", true);
        toggle(&mut list, "TX", true);
        assert_eq!(list, vec!["CA", "TX"]);
        toggle(&mut list, "CA", false);
        assert_eq!(list, vec!["TX"]);
    }

    #[test]
    fn test_update_states_selects_all() {
        let mut panel = ControlPanel::new(
            PathBuf::from("h.csv"),
            PathBuf::from("s.csv"),
            MeasureGroup::Edac,
        );
        panel.selection.states = vec!["CA".to_string()];
        panel.update_states(vec!["CA".to_string(), "TX".to_string()]);
        assert!(panel.selection.states.is_empty());
        assert!(panel.loaded);
    }
}
