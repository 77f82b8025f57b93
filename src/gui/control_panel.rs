//! Control Panel Widget
//! Left side panel with file selection, filter mode and selection controls.

use crate::data::{search_senders, FilterError, LongTable, Selection, Tier};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::collections::BTreeSet;

/// How rows are picked for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    ByTier,
    BySender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Left side control panel with file selection and filter controls.
pub struct ControlPanel {
    pub file_name: Option<String>,
    pub mode: FilterMode,
    pub selected_tier: Option<Tier>,
    pub selected_senders: BTreeSet<String>,
    pub sender_query: String,
    pub status: String,
    pub status_level: StatusLevel,
    pub busy: bool,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            file_name: None,
            mode: FilterMode::default(),
            selected_tier: None,
            selected_senders: BTreeSet::new(),
            sender_query: String::new(),
            status: "Ready".to_string(),
            status_level: StatusLevel::Info,
            busy: false,
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset selections for a freshly processed upload.
    pub fn on_table_loaded(&mut self, file_name: &str, table: &LongTable) {
        self.file_name = Some(file_name.to_string());
        self.selected_tier = table.tiers().first().copied();
        self.selected_senders.clear();
        self.sender_query.clear();
        self.export_enabled = false;
    }

    pub fn on_table_cleared(&mut self) {
        self.selected_tier = None;
        self.selected_senders.clear();
        self.export_enabled = false;
    }

    /// Turn the current controls into a validated selection.
    pub fn selection(&self) -> Result<Selection, FilterError> {
        match self.mode {
            FilterMode::ByTier => Selection::tier(self.selected_tier),
            FilterMode::BySender => Selection::senders(self.selected_senders.iter().cloned()),
        }
    }

    pub fn set_status(&mut self, level: StatusLevel, status: &str) {
        self.status_level = level;
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, table: Option<&LongTable>) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 TierView")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Quarterly Sender ID volume")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .file_name
                        .clone()
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.file_name.is_some() {
                            ui.visuals().strong_text_color()
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.busy, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseFile;
                            }
                        });
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("⚙️ Filter Data").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.mode, FilterMode::ByTier, "By Tier");
            ui.radio_value(&mut self.mode, FilterMode::BySender, "By Sender ID");
        });

        ui.add_space(8.0);

        match (self.mode, table) {
            (_, None) => {
                ui.label(RichText::new("Load a file to choose a filter").color(Color32::GRAY));
            }
            (FilterMode::ByTier, Some(table)) => self.show_tier_picker(ui, table),
            (FilterMode::BySender, Some(table)) => self.show_sender_picker(ui, table),
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(table.is_some() && !self.busy, |ui| {
                let button = egui::Button::new(RichText::new("▶ Show Visualization").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ShowVisualization;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.export_enabled, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("🖼 Export PNG").clicked() {
                        action = ControlPanelAction::ExportPng;
                    }
                    if ui.button("📄 Export CSV").clicked() {
                        action = ControlPanelAction::ExportCsv;
                    }
                });
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.horizontal(|ui| {
            if self.busy {
                ui.spinner();
            }
            let status_color = match self.status_level {
                StatusLevel::Info => Color32::GRAY,
                StatusLevel::Success => Color32::from_rgb(40, 167, 69),
                StatusLevel::Warning => Color32::from_rgb(255, 193, 7),
                StatusLevel::Error => Color32::from_rgb(220, 53, 69),
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }

    fn show_tier_picker(&mut self, ui: &mut egui::Ui, table: &LongTable) {
        ui.label("Select a Sender ID tier to display:");
        let selected_text = self
            .selected_tier
            .map(|t| t.label())
            .unwrap_or_default();

        ComboBox::from_id_salt("tier_select")
            .width(250.0)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for tier in table.tiers() {
                    ui.selectable_value(&mut self.selected_tier, Some(*tier), tier.label());
                }
            });
    }

    fn show_sender_picker(&mut self, ui: &mut egui::Ui, table: &LongTable) {
        ui.label(format!(
            "Select Sender IDs ({} selected):",
            self.selected_senders.len()
        ));
        ui.add(egui::TextEdit::singleline(&mut self.sender_query).hint_text("🔍 Search"));
        ui.add_space(5.0);

        let matches = search_senders(table, &self.sender_query);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                    for id in &matches {
                        let mut checked = self.selected_senders.contains(*id);
                        if ui.checkbox(&mut checked, id.as_str()).changed() {
                            if checked {
                                self.selected_senders.insert((*id).clone());
                            } else {
                                self.selected_senders.remove(*id);
                            }
                        }
                    }
                });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select Shown").clicked() {
                self.selected_senders
                    .extend(matches.iter().map(|id| (*id).clone()));
            }
            if ui.small_button("Clear All").clicked() {
                self.selected_senders.clear();
            }
        });
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    ShowVisualization,
    ExportPng,
    ExportCsv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::data::TierPipeline;
    use polars::prelude::*;

    fn table() -> LongTable {
        let df = DataFrame::new(vec![
            Column::new("Row Labels".into(), ["A", "B"]),
            Column::new("Q1".into(), [1i64, 2]),
            Column::new("Grand Total".into(), [1i64, 2]),
        ])
        .unwrap();
        TierPipeline::new(&AppConfig::default()).run(&df).unwrap()
    }

    #[test]
    fn test_loaded_table_preselects_first_tier() {
        let mut panel = ControlPanel::new();
        panel.selected_senders.insert("old".to_string());
        panel.on_table_loaded("q.csv", &table());

        assert_eq!(panel.selected_tier, Some(Tier::from_rank(0, 10)));
        assert!(panel.selected_senders.is_empty());
        assert_eq!(panel.selection(), Ok(Selection::Tier(Tier::from_rank(0, 10))));
    }

    #[test]
    fn test_sender_mode_without_selection() {
        let mut panel = ControlPanel::new();
        panel.on_table_loaded("q.csv", &table());
        panel.mode = FilterMode::BySender;
        assert_eq!(panel.selection(), Err(FilterError::NoSendersSelected));

        panel.selected_senders.insert("B".to_string());
        assert!(matches!(panel.selection(), Ok(Selection::Senders(_))));
    }

    #[test]
    fn test_cleared_table_has_no_tier() {
        let mut panel = ControlPanel::new();
        panel.on_table_loaded("q.csv", &table());
        panel.on_table_cleared();
        assert_eq!(panel.selection(), Err(FilterError::NoTierSelected));
    }
}
