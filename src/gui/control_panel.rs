//! Control Panel Widget
//! Left side panel: data source selection, date detection settings,
//! export actions and status.

use egui::{Color32, RichText};
use std::path::PathBuf;

use crate::analysis::DateDetector;

/// User settings for analysis
#[derive(Clone)]
pub struct UserSettings {
    pub file_path: Option<PathBuf>,
    /// Comma-separated date-column keywords, editable by the user.
    pub date_keywords: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            date_keywords: DateDetector::default().keywords.join(", "),
        }
    }
}

impl UserSettings {
    /// Build the detector from the keyword field.
    pub fn date_detector(&self) -> DateDetector {
        let keywords: Vec<String> = self
            .date_keywords
            .split(',')
            .map(|kw| kw.trim().to_string())
            .filter(|kw| !kw.is_empty())
            .collect();
        if keywords.is_empty() {
            DateDetector::default()
        } else {
            DateDetector { keywords }
        }
    }
}

/// Left side control panel with file selection and export controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub status: String,
    pub has_analysis: bool,
    pub last_report_path: Option<PathBuf>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            status: "Ready".to_string(),
            has_analysis: false,
            last_report_path: None,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Salescope")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Sales Data Analysis")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .file_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.file_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseFile;
                        }
                    });
                });
            });

        ui.add_space(5.0);
        if ui.button("🧪 Use sample data").clicked() {
            action = ControlPanelAction::LoadSample;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Detection Section =====
        ui.label(RichText::new("🗓 Date Column Keywords").size(14.0).strong());
        ui.add_space(5.0);
        ui.label(
            RichText::new("The first column becomes the time axis when its header contains one of:")
                .size(11.0)
                .color(Color32::GRAY),
        );
        let response = ui.text_edit_singleline(&mut self.settings.date_keywords);
        if response.lost_focus() {
            action = ControlPanelAction::KeywordsChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("📥 Export").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.has_analysis, |ui| {
            ui.vertical_centered_justified(|ui| {
                if ui.button("📝 Save report (TXT)").clicked() {
                    action = ControlPanelAction::SaveReport;
                }
                if ui.button("🖼 Save charts (PNG)").clicked() {
                    action = ControlPanelAction::SaveCharts;
                }
                if ui.button("🧾 Save results (JSON)").clicked() {
                    action = ControlPanelAction::SaveJson;
                }
            });
        });

        if self.last_report_path.is_some() && ui.button("📂 Open saved report").clicked() {
            action = ControlPanelAction::OpenReport;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("ℹ Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("complete") || self.status.contains("saved") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set the status line
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    LoadSample,
    KeywordsChanged,
    SaveReport,
    SaveCharts,
    SaveJson,
    OpenReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_field_builds_the_detector() {
        let settings = UserSettings {
            file_path: None,
            date_keywords: "date, месяц ,period".to_string(),
        };
        let detector = settings.date_detector();
        assert_eq!(detector.keywords, vec!["date", "месяц", "period"]);
        assert!(detector.matches("Reporting Period"));
    }

    #[test]
    fn empty_keyword_field_falls_back_to_defaults() {
        let settings = UserSettings {
            file_path: None,
            date_keywords: " , ".to_string(),
        };
        assert_eq!(settings.date_detector(), DateDetector::default());
    }
}
