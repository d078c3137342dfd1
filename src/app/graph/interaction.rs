use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::render_utils::screen_to_world;
use super::super::{PointerState, ViewModel};

/// Continuous zoom bounds for the graph camera.
const MIN_ZOOM: f32 = 0.5;
const MAX_ZOOM: f32 = 3.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        // Keep the world point under the cursor fixed while zooming.
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer_pos = ui.input(|input| input.pointer.hover_pos());
        pointer_pos.and_then(|pointer| {
            (0..screen_positions.len())
                .filter_map(|index| {
                    let distance = screen_positions[index].distance(pointer);
                    if distance <= screen_radii[index] {
                        Some((index, distance))
                    } else {
                        None
                    }
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
        })
    }

    /// Advances the pointer state machine for this frame. Primary drag on
    /// a node pins and moves it; primary drag on empty space pans, as do
    /// the secondary and middle buttons. Hover is re-derived every frame.
    pub(in crate::app) fn handle_graph_drag(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.pointer = match hovered {
                Some(index) => {
                    if let Some(cache) = self.graph_cache.as_mut()
                        && let Some(node) = cache.nodes.get_mut(index)
                    {
                        let anchor = node.world_pos;
                        node.pin_at(anchor);
                        cache.reheat();
                    }
                    PointerState::DraggingNode(index)
                }
                None => PointerState::Panning,
            };
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            match self.pointer {
                PointerState::DraggingNode(index) => {
                    if let Some(pointer) = response.interact_pointer_pos()
                        && let Some(cache) = self.graph_cache.as_mut()
                        && let Some(node) = cache.nodes.get_mut(index)
                    {
                        node.pin_at(screen_to_world(rect, self.pan, self.zoom, pointer));
                    }
                }
                PointerState::Panning => self.pan += response.drag_delta(),
                PointerState::Idle | PointerState::Hovering(_) => {}
            }
        } else if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }

        if response.drag_stopped_by(egui::PointerButton::Primary) {
            if let PointerState::DraggingNode(index) = self.pointer
                && let Some(cache) = self.graph_cache.as_mut()
            {
                if let Some(node) = cache.nodes.get_mut(index) {
                    node.release();
                }
                cache.reheat();
            }
            self.pointer = PointerState::Idle;
        }

        if !matches!(
            self.pointer,
            PointerState::DraggingNode(_) | PointerState::Panning
        ) {
            self.pointer = match hovered {
                Some(index) => PointerState::Hovering(index),
                None => PointerState::Idle,
            };
        }
    }
}
