use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (node_count, edge_count) = self
            .graph_cache
            .as_ref()
            .map(|cache| (cache.nodes.len(), cache.edges.len()))
            .unwrap_or((0, 0));

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("pivotmap");
                    ui.separator();
                    ui.label(format!("catalog: {} log types", self.catalog.log_count()));
                    ui.label(format!("{} categories", self.catalog.categories.len()));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(selected) = &self.selected {
                            ui.label(format!("selected: {selected}"));
                        }
                        ui.label(format!("showing: {node_count} nodes, {edge_count} edges"));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_graph(ui);
        });
    }
}
