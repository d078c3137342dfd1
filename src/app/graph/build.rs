//! Relationship resolver: derives the graph's node and edge arrays from
//! the catalog and the current active set.
//!
//! Resolution is a pure function of its inputs; the `ViewModel` wrapper
//! only adds position carry-over so the layout survives a rebuild.

use std::collections::{HashMap, HashSet};

use eframe::egui::{Vec2, vec2};

use crate::catalog::{Catalog, LogType};
use crate::util::stable_pair;

use super::super::{
    PhysicsScratch, RenderEdge, RenderGraph, RenderNode, ViewModel, ViewScratch,
};

/// Radius the node would collapse to with no active connections.
const MIN_NODE_RADIUS: f32 = 20.0;
/// Spread of freshly seeded nodes around the origin, in world units.
const SEED_SPREAD: f32 = 180.0;

/// A shared identifier kind that lets an analyst correlate records across
/// two log types. Tags are informational; they never gate edge creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum PivotKind {
    Uid,
    Ip,
    Hash,
    Hostname,
    Ts,
}

impl PivotKind {
    pub(in crate::app) fn label(self) -> &'static str {
        match self {
            Self::Uid => "uid",
            Self::Ip => "ip",
            Self::Hash => "hash",
            Self::Hostname => "hostname",
            Self::Ts => "ts",
        }
    }

    fn matches(self, log: &LogType) -> bool {
        match self {
            Self::Uid => log.has_field("uid"),
            Self::Ip => {
                log.has_field_containing("id.orig_h") || log.has_field_containing("id.resp_h")
            }
            Self::Hash => {
                log.has_field_containing("hash") || log.has_field("md5") || log.has_field("sha1")
            }
            Self::Hostname => {
                log.has_field("query") || log.has_field("host") || log.has_field("server_name")
            }
            // Universal correlation key, handled separately in detect_pivots.
            Self::Ts => true,
        }
    }
}

/// Pivot tags shared by both endpoints. The timestamp pivot is appended
/// unconditionally, so the result is never empty.
pub(in crate::app) fn detect_pivots(a: &LogType, b: &LogType) -> Vec<PivotKind> {
    let mut pivots = Vec::new();
    for kind in [
        PivotKind::Uid,
        PivotKind::Ip,
        PivotKind::Hash,
        PivotKind::Hostname,
    ] {
        if kind.matches(a) && kind.matches(b) {
            pivots.push(kind);
        }
    }
    pivots.push(PivotKind::Ts);
    pivots
}

pub(in crate::app) struct ResolvedGraph {
    /// (log type id, active connection count), in catalog order.
    pub(in crate::app) nodes: Vec<(String, usize)>,
    /// Deduplicated unordered pairs of node indices with pivot metadata.
    pub(in crate::app) edges: Vec<(usize, usize, Vec<PivotKind>)>,
}

/// `radius = max(20, 15 + 5 * connections)` where `connections` counts the
/// node's `related_logs` entries that are themselves active.
pub(in crate::app) fn node_radius(connections: usize) -> f32 {
    (15.0 + (connections as f32) * 5.0).max(MIN_NODE_RADIUS)
}

pub(in crate::app) fn resolve(catalog: &Catalog, active: &HashSet<String>) -> ResolvedGraph {
    // Catalog order keeps node indices deterministic across rebuilds.
    let logs = catalog
        .log_types
        .iter()
        .filter(|log| active.contains(&log.id))
        .collect::<Vec<_>>();

    let nodes = logs
        .iter()
        .map(|log| {
            let connections = log
                .related_logs
                .iter()
                .filter(|id| id.as_str() != log.id && active.contains(id.as_str()))
                .collect::<HashSet<_>>()
                .len();
            (log.id.clone(), connections)
        })
        .collect::<Vec<_>>();

    // Iterating unordered pairs once dedups A->B / B->A declarations for
    // free; dangling related ids simply never show up among the nodes.
    let mut edges = Vec::new();
    for a in 0..logs.len() {
        for b in (a + 1)..logs.len() {
            if catalog.related(&logs[a].id, &logs[b].id) {
                edges.push((a, b, detect_pivots(logs[a], logs[b])));
            }
        }
    }

    ResolvedGraph { nodes, edges }
}

impl ViewModel {
    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        let active = self.effective_active();
        let resolved = resolve(&self.catalog, &active);

        if resolved.nodes.is_empty() {
            self.graph_cache = None;
            self.graph_dirty = false;
            return;
        }

        let mut prior_positions = HashMap::new();
        if let Some(cache) = self.graph_cache.take() {
            for node in cache.nodes {
                prior_positions.insert(node.id, (node.world_pos, node.velocity));
            }
        }

        let nodes = resolved
            .nodes
            .iter()
            .map(|(id, connections)| {
                let (world_pos, velocity) = prior_positions
                    .remove(id)
                    .unwrap_or_else(|| (seed_position(id), Vec2::ZERO));
                let log = self.catalog.log_type(id);
                RenderNode {
                    id: id.clone(),
                    label: log.map(|log| log.name.clone()).unwrap_or_else(|| id.clone()),
                    color: log.map(|log| log.color).unwrap_or([140, 140, 140]),
                    radius: node_radius(*connections),
                    world_pos,
                    velocity,
                    pinned: None,
                }
            })
            .collect::<Vec<_>>();

        let edges = resolved
            .edges
            .into_iter()
            .map(|(a, b, pivots)| RenderEdge { a, b, pivots })
            .collect::<Vec<_>>();

        let mut neighbors = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            neighbors[edge.a].push(edge.b);
            neighbors[edge.b].push(edge.a);
        }

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        self.graph_cache = Some(RenderGraph {
            nodes,
            edges,
            index_by_id,
            neighbors,
            physics_scratch: PhysicsScratch { forces: Vec::new() },
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
            },
        });
        self.graph_dirty = false;
    }
}

fn seed_position(id: &str) -> Vec2 {
    let (x, y) = stable_pair(id);
    vec2(x, y) * SEED_SPREAD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().expect("embedded catalog")
    }

    fn active(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    fn find_node<'a>(graph: &'a ResolvedGraph, id: &str) -> &'a (String, usize) {
        graph
            .nodes
            .iter()
            .find(|(node_id, _)| node_id == id)
            .expect("node present")
    }

    #[test]
    fn edges_are_deduplicated_per_unordered_pair() {
        // conn lists dns and dns lists conn; exactly one edge results.
        let catalog = catalog();
        let graph = resolve(&catalog, &active(&["conn", "dns"]));
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn nodes_and_edges_stay_inside_the_active_set() {
        let catalog = catalog();
        let graph = resolve(&catalog, &active(&["conn", "dns", "files"]));
        assert_eq!(graph.nodes.len(), 3);
        for (a, b, _) in &graph.edges {
            assert!(*a < graph.nodes.len());
            assert!(*b < graph.nodes.len());
        }
    }

    #[test]
    fn dangling_active_ids_are_ignored() {
        let catalog = catalog();
        let graph = resolve(&catalog, &active(&["conn", "not-a-log"]));
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn ts_pivot_is_universal() {
        let catalog = catalog();
        let graph = resolve(
            &catalog,
            &active(&["conn", "dns", "http", "ssl", "files", "x509", "weird"]),
        );
        assert!(!graph.edges.is_empty());
        for (_, _, pivots) in &graph.edges {
            assert!(pivots.contains(&PivotKind::Ts));
            assert!(!pivots.is_empty());
        }
    }

    #[test]
    fn uid_pivot_requires_a_literal_uid_field_on_both_sides() {
        let catalog = catalog();
        let conn = catalog.log_type("conn").unwrap();
        let dns = catalog.log_type("dns").unwrap();
        // dhcp carries `uids`, not `uid`, so the uid pivot must not fire.
        let dhcp = catalog.log_type("dhcp").unwrap();

        assert!(detect_pivots(conn, dns).contains(&PivotKind::Uid));
        assert!(!detect_pivots(conn, dhcp).contains(&PivotKind::Uid));
    }

    #[test]
    fn ip_pivot_matches_on_endpoint_field_fragments() {
        let catalog = catalog();
        let conn = catalog.log_type("conn").unwrap();
        let http = catalog.log_type("http").unwrap();
        let x509 = catalog.log_type("x509").unwrap();

        assert!(detect_pivots(conn, http).contains(&PivotKind::Ip));
        assert!(!detect_pivots(conn, x509).contains(&PivotKind::Ip));
    }

    #[test]
    fn hash_pivot_matches_md5_sha1_or_hash_fragments() {
        let catalog = catalog();
        let files = catalog.log_type("files").unwrap();
        let conn = catalog.log_type("conn").unwrap();

        assert!(detect_pivots(files, files).contains(&PivotKind::Hash));
        assert!(!detect_pivots(files, conn).contains(&PivotKind::Hash));
    }

    #[test]
    fn hostname_pivot_matches_query_host_or_server_name() {
        let catalog = catalog();
        let dns = catalog.log_type("dns").unwrap();
        let http = catalog.log_type("http").unwrap();
        let ssl = catalog.log_type("ssl").unwrap();
        let conn = catalog.log_type("conn").unwrap();

        assert!(detect_pivots(dns, http).contains(&PivotKind::Hostname));
        assert!(detect_pivots(dns, ssl).contains(&PivotKind::Hostname));
        assert!(!detect_pivots(dns, conn).contains(&PivotKind::Hostname));
    }

    #[test]
    fn radius_follows_the_connection_formula() {
        assert_eq!(node_radius(0), 20.0);
        assert_eq!(node_radius(1), 20.0);
        assert_eq!(node_radius(2), 25.0);
        assert_eq!(node_radius(5), 40.0);
    }

    #[test]
    fn conn_dns_http_scenario() {
        let catalog = catalog();
        let graph = resolve(&catalog, &active(&["conn", "dns", "http"]));

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(find_node(&graph, "conn").1, 2);
        assert_eq!(node_radius(find_node(&graph, "conn").1), 25.0);
        assert_eq!(node_radius(find_node(&graph, "dns").1), 20.0);
        assert_eq!(node_radius(find_node(&graph, "http").1), 20.0);
    }
}
