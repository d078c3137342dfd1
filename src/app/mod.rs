use std::collections::{HashMap, HashSet};

use eframe::egui::{Context, Pos2, Vec2};

use crate::catalog::Catalog;

mod graph;
mod physics;
mod render_utils;
mod selection;
mod ui;

use graph::build::PivotKind;

pub struct PivotMapApp {
    model: ViewModel,
}

/// All mutable UI state. The catalog itself is read-only after startup;
/// everything else is either user-toggled state or derived render state
/// rebuilt from it.
struct ViewModel {
    catalog: Catalog,
    active: HashSet<String>,
    enabled_categories: HashSet<String>,
    search: String,
    selected: Option<String>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    show_pivot_labels: bool,
    show_strength: bool,
    detail_tab: DetailTab,
    pointer: PointerState,
    graph_dirty: bool,
    graph_cache: Option<RenderGraph>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DetailTab {
    Fields,
    Pivots,
    Example,
}

/// Pointer gesture state over the graph canvas. Hover is re-derived every
/// frame; drag state persists across frames until the button is released.
#[derive(Clone, Copy, PartialEq, Eq)]
enum PointerState {
    Idle,
    Hovering(usize),
    DraggingNode(usize),
    Panning,
}

/// Derived node/edge arrays plus simulation state. Rebuilt wholesale
/// whenever the active set changes; positions of surviving nodes carry
/// over so the layout does not jump.
struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    index_by_id: HashMap<String, usize>,
    neighbors: Vec<Vec<usize>>,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct RenderNode {
    id: String,
    label: String,
    color: [u8; 3],
    radius: f32,
    world_pos: Vec2,
    velocity: Vec2,
    /// World-space anchor while the node is being dragged.
    pinned: Option<Vec2>,
}

struct RenderEdge {
    a: usize,
    b: usize,
    pivots: Vec<PivotKind>,
}

impl RenderEdge {
    /// Visual weight of the edge: correlation richness, not graph degree.
    /// Always at least 1 because the timestamp pivot is universal.
    fn strength(&self) -> usize {
        self.pivots.len()
    }
}

struct PhysicsScratch {
    forces: Vec<Vec2>,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
}

impl PivotMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, catalog: Catalog) -> Self {
        Self {
            model: ViewModel::new(catalog),
        }
    }
}

impl eframe::App for PivotMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.model.show(ctx);
    }
}
