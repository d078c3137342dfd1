use eframe::egui::{self, Color32, RichText, Ui};

use super::super::render_utils::{field_kind_color, rgb};
use super::super::{DetailTab, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Log Type Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a log type from the graph or the sidebar.");
            return;
        };

        let Some(log) = self.catalog.log_type(&selected_id) else {
            ui.label("Selected log type is not part of the loaded catalog.");
            return;
        };

        let name = log.name.clone();
        let description = log.description.clone();
        let example = log.example.clone();
        let fields = log.fields.clone();
        let category_badge = self
            .catalog
            .category(&log.category)
            .map(|category| (category.name.clone(), rgb(category.color)))
            .unwrap_or_else(|| ("unknown category".to_owned(), Color32::from_gray(140)));

        ui.horizontal(|ui| {
            ui.label(RichText::new(&name).strong().size(16.0));
            ui.label(RichText::new(category_badge.0).color(category_badge.1).small());
        });
        ui.add_space(2.0);
        ui.label(description.as_str());
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.detail_tab, DetailTab::Fields, "Fields");
            ui.selectable_value(&mut self.detail_tab, DetailTab::Pivots, "Pivots");
            ui.selectable_value(&mut self.detail_tab, DetailTab::Example, "Example");
        });
        ui.separator();

        match self.detail_tab {
            DetailTab::Fields => {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for field in &fields {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(&field.name).monospace().strong());
                                ui.label(
                                    RichText::new(field.kind.label())
                                        .color(field_kind_color(field.kind))
                                        .small(),
                                );
                                if field.optional {
                                    ui.label(
                                        RichText::new("optional")
                                            .color(Color32::from_gray(130))
                                            .small(),
                                    );
                                }
                            });
                            ui.small(field.description.as_str());
                            ui.add_space(4.0);
                        }
                    });
            }
            DetailTab::Pivots => self.draw_pivot_rows(ui, &selected_id),
            DetailTab::Example => {
                if example.is_empty() {
                    ui.label("No example record available for this log type.");
                } else {
                    if ui
                        .button("Copy example")
                        .on_hover_text("Copy the sample record to the clipboard.")
                        .clicked()
                    {
                        ui.ctx().copy_text(example.clone());
                    }
                    ui.add_space(4.0);
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            ui.label(RichText::new(&example).monospace().small());
                        });
                }
            }
        }
    }

    /// Lists the active log types the selection can pivot into, with the
    /// shared identifier kinds per relationship, straight from the
    /// resolver's edge metadata.
    fn draw_pivot_rows(&mut self, ui: &mut Ui, selected_id: &str) {
        let rows = self
            .graph_cache
            .as_ref()
            .and_then(|cache| {
                let index = *cache.index_by_id.get(selected_id)?;
                let mut rows = Vec::new();
                for edge in &cache.edges {
                    let other = if edge.a == index {
                        edge.b
                    } else if edge.b == index {
                        edge.a
                    } else {
                        continue;
                    };
                    let other_node = cache.nodes.get(other)?;
                    rows.push((
                        other_node.id.clone(),
                        other_node.label.clone(),
                        edge.pivots
                            .iter()
                            .map(|pivot| pivot.label())
                            .collect::<Vec<_>>(),
                    ));
                }
                rows.sort_by(|a, b| a.1.cmp(&b.1));
                Some(rows)
            })
            .unwrap_or_default();

        if rows.is_empty() {
            ui.label("No active related log types. Enable more log types to see pivot points.");
            return;
        }

        let mut pending_selection = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (other_id, other_name, pivots) in &rows {
                    ui.horizontal(|ui| {
                        if ui
                            .link(RichText::new(other_name).strong())
                            .on_hover_text("Jump to this log type.")
                            .clicked()
                        {
                            pending_selection = Some(other_id.clone());
                        }
                        ui.label(
                            RichText::new(format!("pivot on: {}", pivots.join(", ")))
                                .color(Color32::from_gray(180))
                                .small(),
                        );
                    });
                    ui.add_space(2.0);
                }
            });

        if let Some(id) = pending_selection {
            self.select_log_type(&id);
        }
    }
}
