//! Active-set and selection state transitions.
//!
//! Every operation here mutates the shared state atomically and marks the
//! render graph dirty; the resolver only ever observes the state after a
//! whole toggle has been applied.

use std::collections::HashSet;

use eframe::egui::Vec2;

use crate::catalog::Catalog;

use super::{DetailTab, PointerState, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(catalog: Catalog) -> Self {
        // All catalog ids start active; the default set is a rule, not a
        // literal list, so a custom catalog can never drift out of sync.
        let active = catalog
            .log_types
            .iter()
            .map(|log| log.id.clone())
            .collect::<HashSet<_>>();
        let enabled_categories = catalog
            .categories
            .iter()
            .map(|category| category.id.clone())
            .collect::<HashSet<_>>();

        Self {
            catalog,
            active,
            enabled_categories,
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            show_pivot_labels: false,
            show_strength: false,
            detail_tab: DetailTab::Fields,
            pointer: PointerState::Idle,
            graph_dirty: true,
            graph_cache: None,
        }
    }

    /// The node set handed to the resolver: active ids whose category is
    /// enabled. Ids referencing unknown catalog entries never get here.
    pub(in crate::app) fn effective_active(&self) -> HashSet<String> {
        self.active
            .iter()
            .filter(|id| {
                self.catalog
                    .log_type(id)
                    .is_some_and(|log| self.enabled_categories.contains(&log.category))
            })
            .cloned()
            .collect()
    }

    pub(in crate::app) fn toggle_log_type(&mut self, id: &str) {
        if self.active.contains(id) {
            self.active.remove(id);
            if self.selected.as_deref() == Some(id) {
                self.selected = None;
            }
        } else if self.catalog.log_type(id).is_some() {
            self.active.insert(id.to_owned());
        }
        self.graph_dirty = true;
    }

    pub(in crate::app) fn set_category_enabled(&mut self, category_id: &str, enabled: bool) {
        let changed = if enabled {
            self.enabled_categories.insert(category_id.to_owned())
        } else {
            self.enabled_categories.remove(category_id)
        };
        if !changed {
            return;
        }

        if !enabled {
            self.clear_selection_in_category(category_id);
        }
        self.graph_dirty = true;
    }

    /// Bulk-activate or bulk-deactivate every log type of a category.
    /// Applied in one step; idempotent when nothing is left to change.
    pub(in crate::app) fn set_category_all(&mut self, category_id: &str, active: bool) {
        let ids = self
            .catalog
            .log_types
            .iter()
            .filter(|log| log.category == category_id)
            .map(|log| log.id.clone())
            .collect::<Vec<_>>();

        let mut changed = false;
        for id in ids {
            changed |= if active {
                self.active.insert(id)
            } else {
                self.active.remove(&id)
            };
        }
        if !changed {
            return;
        }

        if !active {
            self.clear_selection_in_category(category_id);
        }
        self.graph_dirty = true;
    }

    /// Select a log type from a list row, activating it if needed so the
    /// selection always refers to a node present in the graph.
    pub(in crate::app) fn select_log_type(&mut self, id: &str) {
        let Some(log) = self.catalog.log_type(id) else {
            return;
        };
        if self.active.insert(id.to_owned()) {
            self.graph_dirty = true;
        }
        if self.enabled_categories.insert(log.category.clone()) {
            self.graph_dirty = true;
        }
        self.selected = Some(id.to_owned());
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        self.selected = selected;
    }

    fn clear_selection_in_category(&mut self, category_id: &str) {
        let selected_in_category = self
            .selected
            .as_deref()
            .and_then(|id| self.catalog.log_type(id))
            .is_some_and(|log| log.category == category_id);
        if selected_in_category {
            self.selected = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ViewModel {
        ViewModel::new(Catalog::embedded().expect("embedded catalog"))
    }

    #[test]
    fn everything_is_active_by_default() {
        let model = model();
        assert_eq!(model.effective_active().len(), model.catalog.log_count());
    }

    #[test]
    fn toggling_off_the_selected_type_clears_selection() {
        let mut model = model();
        model.select_log_type("dns");
        assert_eq!(model.selected.as_deref(), Some("dns"));

        model.toggle_log_type("dns");
        assert!(model.selected.is_none());
        assert!(!model.effective_active().contains("dns"));
    }

    #[test]
    fn toggling_off_another_type_keeps_selection() {
        let mut model = model();
        model.select_log_type("dns");
        model.toggle_log_type("http");
        assert_eq!(model.selected.as_deref(), Some("dns"));
    }

    #[test]
    fn disabling_a_category_clears_selection_inside_it() {
        let mut model = model();
        model.select_log_type("files");
        model.set_category_enabled("files", false);
        assert!(model.selected.is_none());
        assert!(!model.effective_active().contains("files"));
        assert!(!model.effective_active().contains("x509"));
    }

    #[test]
    fn disabling_a_category_keeps_selection_outside_it() {
        let mut model = model();
        model.select_log_type("conn");
        model.set_category_enabled("files", false);
        assert_eq!(model.selected.as_deref(), Some("conn"));
    }

    #[test]
    fn category_bulk_disable_is_idempotent() {
        let mut model = model();
        model.set_category_all("network", false);
        let after_first = model.effective_active();
        model.graph_dirty = false;

        model.set_category_all("network", false);
        assert_eq!(model.effective_active(), after_first);
        // no-op second call must not mark the graph dirty again
        assert!(!model.graph_dirty);
    }

    #[test]
    fn selecting_reactivates_and_reenables() {
        let mut model = model();
        model.toggle_log_type("x509");
        model.set_category_enabled("files", false);

        model.select_log_type("x509");
        assert_eq!(model.selected.as_deref(), Some("x509"));
        assert!(model.effective_active().contains("x509"));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut model = model();
        model.toggle_log_type("nope");
        model.select_log_type("nope");
        assert!(model.selected.is_none());
        assert!(!model.effective_active().contains("nope"));
    }
}
