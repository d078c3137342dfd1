use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::physics::{PhysicsConfig, step_physics};
use super::super::render_utils::{
    blend_color, dim_color, draw_background, rgb, strength_color, world_to_screen,
};
use super::super::{PointerState, ViewModel};

impl ViewModel {
    fn update_screen_space(
        rect: egui::Rect,
        pan: egui::Vec2,
        zoom: f32,
        cache: &mut super::super::RenderGraph,
    ) {
        cache.view_scratch.screen_positions.clear();
        cache.view_scratch.screen_radii.clear();
        for node in &cache.nodes {
            cache
                .view_scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, node.world_pos));
            cache.view_scratch.screen_radii.push(node.radius * zoom);
        }
    }

    /// Node indices whose name fuzzy-matches the search box. The graph is
    /// a few dozen nodes at most, so this is recomputed per frame.
    fn search_matches(&self) -> Option<HashSet<usize>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }
        let cache = self.graph_cache.as_ref()?;

        let matcher = SkimMatcherV2::default();
        Some(
            cache
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(index, node)| {
                    matcher
                        .fuzzy_match(&node.label, query)
                        .or_else(|| matcher.fuzzy_match(&node.id, query))
                        .map(|_| index)
                })
                .collect(),
        )
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        // Zero-sized viewport: nothing is measured yet, defer everything.
        if rect.width() < 1.0 || rect.height() < 1.0 {
            return;
        }

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);

        if self.graph_cache.is_none() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No log types selected",
                FontId::proportional(16.0),
                Color32::from_gray(150),
            );
            painter.text(
                rect.center() + vec2(0.0, 24.0),
                Align2::CENTER_CENTER,
                "Enable log types in the sidebar to explore their pivot relationships.",
                FontId::proportional(12.0),
                Color32::from_gray(110),
            );
            return;
        }

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let physics = PhysicsConfig {
            intensity: 1.0,
            delta_seconds: frame_delta_seconds,
        };

        let live_physics = self.live_physics;
        let (physics_moving, hovered) = {
            let pan = self.pan;
            let zoom = self.zoom;
            let Some(cache) = self.graph_cache.as_mut() else {
                return;
            };

            let moving = if live_physics {
                step_physics(cache, physics)
            } else {
                false
            };

            Self::update_screen_space(rect, pan, zoom, cache);
            let hovered = Self::hovered_index(
                ui,
                &cache.view_scratch.screen_positions,
                &cache.view_scratch.screen_radii,
            )
            .map(|(index, _)| index);
            (moving, hovered)
        };

        self.handle_graph_drag(rect, &response, hovered);
        let interaction_active = matches!(
            self.pointer,
            PointerState::DraggingNode(_) | PointerState::Panning
        );
        if physics_moving || interaction_active {
            ui.ctx().request_repaint();
        }
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        // A click that survived drag disambiguation selects the node under
        // the pointer, or clears the selection on empty space.
        let pending_selection = if response.clicked_by(egui::PointerButton::Primary) {
            Some(hovered)
        } else {
            None
        };

        let search_matches = self.search_matches();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        let hover_focus = match self.pointer {
            PointerState::Hovering(index) | PointerState::DraggingNode(index) => Some(index),
            PointerState::Idle | PointerState::Panning => None,
        };
        let selected_id = self.selected.clone();
        let show_pivot_labels = self.show_pivot_labels;
        let show_strength = self.show_strength;
        let pan = self.pan;
        let zoom = self.zoom;
        let zoom_sqrt = zoom.sqrt();

        let Some(cache) = self.graph_cache.as_mut() else {
            return;
        };
        // Dragging or panning may have moved things this frame.
        Self::update_screen_space(rect, pan, zoom, cache);

        let hover_neighbors = hover_focus
            .and_then(|index| cache.neighbors.get(index))
            .map(|neighbors| neighbors.iter().copied().collect::<HashSet<_>>())
            .unwrap_or_default();

        for edge in &cache.edges {
            let start = cache.view_scratch.screen_positions[edge.a];
            let end = cache.view_scratch.screen_positions[edge.b];

            let touches_hover =
                hover_focus.is_some_and(|index| edge.a == index || edge.b == index);
            let (mut line_width, mut line_color) = if show_strength {
                (
                    ((0.8 + edge.strength() as f32 * 0.6) * zoom_sqrt).clamp(0.8, 5.0),
                    strength_color(edge.strength()),
                )
            } else {
                (
                    (1.4 * zoom_sqrt).clamp(0.8, 2.6),
                    Color32::from_rgba_unmultiplied(90, 100, 110, 170),
                )
            };
            if touches_hover {
                line_width = (line_width * 1.6).clamp(1.6, 6.0);
                line_color = blend_color(line_color, Color32::from_rgb(255, 164, 101), 0.65);
            } else if hover_focus.is_some() {
                line_color = dim_color(line_color, 0.45);
            }

            painter.line_segment([start, end], Stroke::new(line_width, line_color));

            if show_pivot_labels && (end - start).length_sq() > 40.0 * 40.0 {
                let mid = start + (end - start) * 0.5;
                let label = edge
                    .pivots
                    .iter()
                    .map(|pivot| pivot.label())
                    .collect::<Vec<_>>()
                    .join(" | ");
                let label_color = if touches_hover || hover_focus.is_none() {
                    Color32::from_gray(190)
                } else {
                    Color32::from_gray(110)
                };
                painter.text(
                    mid,
                    Align2::CENTER_CENTER,
                    label,
                    FontId::proportional(10.0),
                    label_color,
                );
            }
        }

        for (index, node) in cache.nodes.iter().enumerate() {
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];

            let is_selected = selected_id.as_deref() == Some(node.id.as_str());
            let is_hovered = hover_focus == Some(index);
            let is_neighbor = hover_neighbors.contains(&index);
            let is_search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = rgb(node.color);
            let fill = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.35)
            } else if is_neighbor {
                blend_color(base_color, Color32::WHITE, 0.15)
            } else if hover_focus.is_some() {
                dim_color(base_color, 0.45)
            } else if is_search_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.45)
            } else if search_active {
                dim_color(base_color, 0.4)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, fill);

            // The selection outline is independent of hover emphasis.
            if is_selected {
                painter.circle_stroke(
                    position,
                    radius + 3.5,
                    Stroke::new(2.5, Color32::from_rgb(245, 206, 93)),
                );
            }
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.2, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            let should_draw_label =
                is_selected || is_hovered || is_neighbor || is_search_match || radius > 14.0;
            if should_draw_label {
                let label_color = if hover_focus.is_some() && !is_hovered && !is_neighbor {
                    Color32::from_gray(140)
                } else {
                    Color32::from_gray(238)
                };
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.label,
                    FontId::proportional(12.0),
                    label_color,
                );
            }
        }

        if let Some(hovered_index) = hover_focus
            && let Some(node) = cache.nodes.get(hovered_index)
            && let Some(log) = self.catalog.log_type(&node.id)
        {
            let category = self
                .catalog
                .category(&log.category)
                .map(|category| category.name.as_str())
                .unwrap_or("unknown category");
            let panel_text = format!(
                "{}  |  {}  |  {} fields  |  {} connections",
                log.name,
                category,
                log.fields.len(),
                cache.neighbors.get(hovered_index).map_or(0, Vec::len),
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if let Some(clicked) = pending_selection {
            let selected = clicked.and_then(|index| {
                self.graph_cache
                    .as_ref()
                    .and_then(|cache| cache.nodes.get(index))
                    .map(|node| node.id.clone())
            });
            self.set_selected(selected);
        }
    }
}
