use eframe::egui::{self, Color32, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::ViewModel;
use super::super::render_utils::rgb;

/// A deferred sidebar mutation. Rows are built while the catalog is
/// borrowed, so state changes are collected and applied afterwards.
enum SidebarAction {
    ToggleLog(String),
    SelectLog(String),
    SetCategoryEnabled(String, bool),
    SetCategoryAll(String, bool),
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Catalog");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search")
            .on_hover_text("Fuzzy-match log types by name; matching nodes light up in the graph.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();
        ui.label(RichText::new("Display").strong());
        ui.checkbox(&mut self.show_pivot_labels, "Pivot labels")
            .on_hover_text("Render the shared pivot keys along each edge.");
        ui.checkbox(&mut self.show_strength, "Connection strength")
            .on_hover_text("Weight and color edges by how many pivot keys the endpoints share.");
        ui.checkbox(&mut self.live_physics, "Live physics")
            .on_hover_text("Continuously simulate layout forces while viewing the graph.");

        ui.separator();

        let matcher = SkimMatcherV2::default();
        let query = self.search.trim().to_owned();
        let mut actions = Vec::new();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for category in &self.catalog.categories {
                    let enabled = self.enabled_categories.contains(&category.id);

                    egui::CollapsingHeader::new(
                        RichText::new(&category.name).color(rgb(category.color)),
                    )
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.small(category.description.as_str());
                        ui.horizontal(|ui| {
                            let mut enabled_flag = enabled;
                            if ui
                                .checkbox(&mut enabled_flag, "Enabled")
                                .on_hover_text("Show or hide this whole category in the graph.")
                                .changed()
                            {
                                actions.push(SidebarAction::SetCategoryEnabled(
                                    category.id.clone(),
                                    enabled_flag,
                                ));
                            }
                            if ui.small_button("all").clicked() {
                                actions.push(SidebarAction::SetCategoryAll(
                                    category.id.clone(),
                                    true,
                                ));
                            }
                            if ui.small_button("none").clicked() {
                                actions.push(SidebarAction::SetCategoryAll(
                                    category.id.clone(),
                                    false,
                                ));
                            }
                        });
                        ui.add_space(2.0);

                        for log in self
                            .catalog
                            .log_types
                            .iter()
                            .filter(|log| log.category == category.id)
                        {
                            if !query.is_empty()
                                && matcher.fuzzy_match(&log.name, &query).is_none()
                                && matcher.fuzzy_match(&log.id, &query).is_none()
                            {
                                continue;
                            }

                            ui.horizontal(|ui| {
                                let mut active = self.active.contains(&log.id);
                                if ui.checkbox(&mut active, "").changed() {
                                    actions.push(SidebarAction::ToggleLog(log.id.clone()));
                                }

                                let is_selected = self.selected.as_deref() == Some(log.id.as_str());
                                let label = RichText::new(&log.name).color(if enabled {
                                    rgb(log.color)
                                } else {
                                    Color32::from_gray(110)
                                });
                                if ui
                                    .selectable_label(is_selected, label)
                                    .on_hover_text(log.description.as_str())
                                    .clicked()
                                {
                                    actions.push(SidebarAction::SelectLog(log.id.clone()));
                                }
                            });
                        }
                    });
                    ui.add_space(4.0);
                }
            });

        for action in actions {
            match action {
                SidebarAction::ToggleLog(id) => self.toggle_log_type(&id),
                SidebarAction::SelectLog(id) => self.select_log_type(&id),
                SidebarAction::SetCategoryEnabled(id, enabled) => {
                    self.set_category_enabled(&id, enabled)
                }
                SidebarAction::SetCategoryAll(id, active) => self.set_category_all(&id, active),
            }
        }
    }
}
