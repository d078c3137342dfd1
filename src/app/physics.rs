//! Frame-sliced force simulation over the render graph.
//!
//! One `step_physics` call per rendered frame: accumulate forces into a
//! scratch buffer, integrate with damping, then recenter. The return value
//! reports whether anything still moves, which drives `request_repaint`.

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

use super::{RenderGraph, RenderNode};

/// Target separation of connected nodes, in world units.
const LINK_DISTANCE: f32 = 120.0;
const LINK_STIFFNESS: f32 = 0.045;
const LINK_DAMPING: f32 = 0.18;
/// Charge-style many-body strength; force falls off with squared distance.
const REPULSION_STRENGTH: f32 = 300.0;
const REPULSION_RANGE: f32 = 130.0;
const REPULSION_SOFTENING: f32 = 600.0;
/// Extra clearance around each node circle for the collision force.
const COLLISION_PADDING: f32 = 10.0;
const COLLISION_STRENGTH: f32 = 0.65;
/// Weak pull toward the viewport center to keep the layout on screen.
const CENTER_PULL: f32 = 0.012;

const MAX_FORCE: f32 = 180.0;
const MAX_SPEED: f32 = 22.0;
const SLEEP_SPEED: f32 = 0.05;
const SLEEP_FORCE: f32 = 0.25;

#[derive(Clone, Copy)]
pub(super) struct PhysicsConfig {
    pub(super) intensity: f32,
    pub(super) delta_seconds: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            delta_seconds: 1.0 / 60.0,
        }
    }
}

fn separation_direction(delta: Vec2, a: usize, b: usize) -> (f32, Vec2) {
    let distance = delta.length();
    if distance > 0.0001 {
        (distance, delta / distance)
    } else {
        // Coincident nodes: push apart along a stable arbitrary direction.
        let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
        (0.0001, vec2(angle.cos(), angle.sin()))
    }
}

pub(super) fn step_physics(cache: &mut RenderGraph, config: PhysicsConfig) -> bool {
    let node_count = cache.nodes.len();
    if node_count < 2 {
        return false;
    }

    let intensity = config.intensity.clamp(0.2, 2.5);
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);
    let damping_factor = 0.86_f32.powf(time_step_scale);

    let forces = &mut cache.physics_scratch.forces;
    forces.resize(node_count, Vec2::ZERO);
    forces.fill(Vec2::ZERO);

    // Many-body repulsion and radius-aware collision, all pairs. The
    // catalog caps the node count at a few dozen, so no spatial index.
    for a in 0..node_count {
        for b in (a + 1)..node_count {
            let delta = cache.nodes[a].world_pos - cache.nodes[b].world_pos;
            let (distance, direction) = separation_direction(delta, a, b);

            let repulsion = (REPULSION_STRENGTH * REPULSION_RANGE * intensity)
                / (distance * distance + REPULSION_SOFTENING);
            forces[a] += direction * repulsion;
            forces[b] -= direction * repulsion;

            let min_distance =
                cache.nodes[a].radius + cache.nodes[b].radius + COLLISION_PADDING;
            if distance < min_distance {
                let push = (min_distance - distance) * COLLISION_STRENGTH * intensity;
                forces[a] += direction * push;
                forces[b] -= direction * push;
            }
        }
    }

    // Spring force along edges toward the target separation.
    for edge in &cache.edges {
        let (a, b) = (edge.a, edge.b);
        if a >= node_count || b >= node_count || a == b {
            continue;
        }

        let delta = cache.nodes[a].world_pos - cache.nodes[b].world_pos;
        let (distance, direction) = separation_direction(delta, a, b);

        let spring = (distance - LINK_DISTANCE) * LINK_STIFFNESS * intensity;
        let relative_velocity = cache.nodes[a].velocity - cache.nodes[b].velocity;
        let damping_force = relative_velocity.dot(direction) * LINK_DAMPING;
        let correction = direction * (spring + damping_force);

        forces[a] -= correction;
        forces[b] += correction;
    }

    for (index, force) in forces.iter_mut().enumerate() {
        *force -= cache.nodes[index].world_pos * (CENTER_PULL * intensity);
    }

    let any_pinned = cache.nodes.iter().any(|node| node.pinned.is_some());
    let max_force_sq = MAX_FORCE * MAX_FORCE;
    let max_speed_sq = MAX_SPEED * MAX_SPEED;
    let mut any_motion = false;

    for (index, force_value) in forces.iter().enumerate() {
        let node = &mut cache.nodes[index];

        if let Some(anchor) = node.pinned {
            node.world_pos = anchor;
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut force = *force_value;
        let force_sq = force.length_sq();
        if force_sq > max_force_sq {
            force *= MAX_FORCE / force_sq.sqrt();
        }

        let mut velocity = (node.velocity + force * (0.055 * time_step_scale)) * damping_factor;
        let mut speed_sq = velocity.length_sq();
        if speed_sq > max_speed_sq {
            velocity *= MAX_SPEED / speed_sq.sqrt();
            speed_sq = max_speed_sq;
        }

        if speed_sq < SLEEP_SPEED * SLEEP_SPEED && force_sq < SLEEP_FORCE * SLEEP_FORCE {
            velocity = Vec2::ZERO;
            speed_sq = 0.0;
        }

        node.velocity = velocity;
        node.world_pos += velocity * time_step_scale;
        if speed_sq > 0.0 {
            any_motion = true;
        }
    }

    // Recentering while a drag is active would fight the pointer anchor.
    if !any_pinned {
        let mut centroid = Vec2::ZERO;
        for node in &cache.nodes {
            centroid += node.world_pos;
        }
        centroid /= node_count as f32;
        if centroid.length_sq() > 0.000_001 {
            for node in &mut cache.nodes {
                node.world_pos -= centroid;
            }
        }
    }

    any_motion
}

impl RenderGraph {
    /// Kick every free node so a disturbed layout visibly re-settles,
    /// e.g. after a dragged node is released.
    pub(super) fn reheat(&mut self) {
        for node in &mut self.nodes {
            if node.pinned.is_some() {
                continue;
            }
            let (x, y) = stable_pair(&node.id);
            node.velocity += vec2(x, y) * 2.5;
        }
    }
}

impl RenderNode {
    pub(super) fn pin_at(&mut self, anchor: Vec2) {
        self.pinned = Some(anchor);
        self.world_pos = anchor;
        self.velocity = Vec2::ZERO;
    }

    pub(super) fn release(&mut self) {
        self.pinned = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::app::ViewModel;
    use crate::catalog::Catalog;

    fn model_with_active(ids: &[&str]) -> ViewModel {
        let mut model = ViewModel::new(Catalog::embedded().expect("embedded catalog"));
        model.active = ids.iter().map(|id| (*id).to_owned()).collect::<HashSet<_>>();
        model.rebuild_render_graph();
        model
    }

    #[test]
    fn five_node_star_converges_within_bounds() {
        // conn with four leaves: 5 nodes, 4 edges.
        let mut model = model_with_active(&["conn", "dns", "http", "ssl", "ssh"]);
        let cache = model.graph_cache.as_mut().expect("graph present");
        assert_eq!(cache.nodes.len(), 5);
        assert_eq!(cache.edges.len(), 4);

        let mut converged_at = None;
        for tick in 0..5_000 {
            if !step_physics(cache, PhysicsConfig::default()) {
                converged_at = Some(tick);
                break;
            }
        }

        assert!(converged_at.is_some(), "simulation never went to sleep");
        for node in &cache.nodes {
            assert!(node.world_pos.length() < 1_000.0, "layout escaped bounds");
            assert!(node.world_pos.x.is_finite() && node.world_pos.y.is_finite());
        }
    }

    #[test]
    fn converged_layout_stays_asleep() {
        let mut model = model_with_active(&["conn", "dns", "http"]);
        let cache = model.graph_cache.as_mut().expect("graph present");

        let mut settled = false;
        for _ in 0..5_000 {
            if !step_physics(cache, PhysicsConfig::default()) {
                settled = true;
                break;
            }
        }
        assert!(settled, "simulation never went to sleep");
        for _ in 0..20 {
            assert!(!step_physics(cache, PhysicsConfig::default()));
        }
    }

    #[test]
    fn pinned_node_holds_its_anchor() {
        let mut model = model_with_active(&["conn", "dns", "http"]);
        let cache = model.graph_cache.as_mut().expect("graph present");

        let anchor = vec2(400.0, -250.0);
        cache.nodes[0].pin_at(anchor);
        for _ in 0..200 {
            step_physics(cache, PhysicsConfig::default());
        }
        assert_eq!(cache.nodes[0].world_pos, anchor);

        cache.nodes[0].release();
        cache.reheat();
        assert!(step_physics(cache, PhysicsConfig::default()));
    }

    #[test]
    fn single_node_needs_no_simulation() {
        let mut model = model_with_active(&["conn"]);
        let cache = model.graph_cache.as_mut().expect("graph present");
        assert!(!step_physics(cache, PhysicsConfig::default()));
    }
}
