//! Layered graph layout
//!
//! A small Sugiyama-style engine: cycles are broken by reversing DFS back
//! edges, nodes are ranked by longest path, ranks are ordered with
//! barycenter sweeps and finally placed on a grid of ranks. The engine is
//! deterministic for a fixed input and holds no state between calls; a new
//! [`LayeredLayout`] is built for every layout pass.

use super::{GraphEdge, GraphNode, Position, Size};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{depth_first_search, DfsEvent, EdgeRef};
use petgraph::Direction::{Incoming, Outgoing};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Gap between ranks
pub const DEFAULT_RANK_SEP: f64 = 50.0;

/// Gap between neighbouring nodes of the same rank
pub const DEFAULT_NODE_SEP: f64 = 50.0;

/// Barycenter sweeps run while ordering ranks
const ORDER_SWEEPS: usize = 8;

/// Flow direction of the ranked drawing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutDirection {
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "LR")]
    LeftToRight,
}

impl LayoutDirection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TopToBottom => "TB",
            Self::LeftToRight => "LR",
        }
    }

    /// Label of the control that selects this direction
    pub fn label(&self) -> &'static str {
        match self {
            Self::TopToBottom => "vertical layout",
            Self::LeftToRight => "horizontal layout",
        }
    }
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LayoutDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TB" | "TD" | "VERTICAL" => Ok(Self::TopToBottom),
            "LR" | "HORIZONTAL" => Ok(Self::LeftToRight),
            other => Err(format!("unknown layout direction '{}' (expected TB or LR)", other)),
        }
    }
}

/// Black-box layout contract: one absolute position per input node
pub trait LayoutEngine {
    fn layout(
        &self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
        direction: LayoutDirection,
    ) -> Vec<Position>;
}

/// Layered (ranked) layout engine
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    pub rank_sep: f64,
    pub node_sep: f64,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            rank_sep: DEFAULT_RANK_SEP,
            node_sep: DEFAULT_NODE_SEP,
        }
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(
        &self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
        direction: LayoutDirection,
    ) -> Vec<Position> {
        if nodes.is_empty() {
            return Vec::new();
        }

        // Nodes sharing an id share one slot
        let mut slot_of: HashMap<&str, usize> = HashMap::new();
        let mut sizes: Vec<Size> = Vec::new();
        let node_slots: Vec<usize> = nodes
            .iter()
            .map(|node| {
                *slot_of.entry(node.id.as_str()).or_insert_with(|| {
                    sizes.push(node.size);
                    sizes.len() - 1
                })
            })
            .collect();

        // Self-loops and edges to unknown nodes do not take part in ranking
        let links: Vec<(usize, usize)> = edges
            .iter()
            .filter_map(|edge| {
                let source = *slot_of.get(edge.source.as_str())?;
                let target = *slot_of.get(edge.target.as_str())?;
                (source != target).then_some((source, target))
            })
            .collect();

        let dag = build_dag(sizes.len(), &break_cycles(sizes.len(), &links));
        let ranks = assign_ranks(&dag);
        let layers = order_layers(&dag, &ranks);
        let slot_positions = self.place(&layers, &sizes, direction);

        node_slots.iter().map(|&slot| slot_positions[slot]).collect()
    }
}

impl LayeredLayout {
    /// Lay ranks out along the flow axis and nodes side by side within a rank
    fn place(
        &self,
        layers: &[Vec<usize>],
        sizes: &[Size],
        direction: LayoutDirection,
    ) -> Vec<Position> {
        // (breadth, depth) extent of a node relative to the flow direction
        let extent = |size: &Size| match direction {
            LayoutDirection::TopToBottom => (size.width, size.height),
            LayoutDirection::LeftToRight => (size.height, size.width),
        };

        let mut centers = vec![(0.0_f64, 0.0_f64); sizes.len()];
        let mut depth_offset = 0.0;

        for layer in layers {
            let band = layer
                .iter()
                .map(|&slot| extent(&sizes[slot]).1)
                .fold(0.0, f64::max);
            let total: f64 = layer.iter().map(|&slot| extent(&sizes[slot]).0).sum::<f64>()
                + layer.len().saturating_sub(1) as f64 * self.node_sep;

            let mut cursor = -total / 2.0;
            for &slot in layer {
                let breadth = extent(&sizes[slot]).0;
                centers[slot] = (cursor + breadth / 2.0, depth_offset + band / 2.0);
                cursor += breadth + self.node_sep;
            }

            depth_offset += band + self.rank_sep;
        }

        let mut positions: Vec<Position> = centers
            .iter()
            .zip(sizes)
            .map(|(&(breadth, depth), size)| {
                let (cx, cy) = match direction {
                    LayoutDirection::TopToBottom => (breadth, depth),
                    LayoutDirection::LeftToRight => (depth, breadth),
                };
                Position::new(cx - size.width / 2.0, cy - size.height / 2.0)
            })
            .collect();

        let min_x = positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        for position in &mut positions {
            position.x -= min_x;
            position.y -= min_y;
        }

        positions
    }
}

/// Lay out `nodes` with a freshly built engine, keeping ids and payloads
pub fn layout_graph(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    direction: LayoutDirection,
) -> Vec<GraphNode> {
    let engine = LayeredLayout::default();
    let positions = engine.layout(nodes, edges, direction);

    nodes
        .iter()
        .zip(positions)
        .map(|(node, position)| node.at(position))
        .collect()
}

fn build_dag(node_count: usize, links: &[(usize, usize)]) -> DiGraph<(), ()> {
    let mut graph = DiGraph::with_capacity(node_count, links.len());
    for _ in 0..node_count {
        graph.add_node(());
    }
    for &(source, target) in links {
        graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
    }
    graph
}

/// Reverse every DFS back edge so the link set becomes acyclic
fn break_cycles(node_count: usize, links: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let graph = build_dag(node_count, links);
    let mut back_edges: HashSet<(usize, usize)> = HashSet::new();

    depth_first_search(&graph, graph.node_indices(), |event| {
        if let DfsEvent::BackEdge(from, to) = event {
            back_edges.insert((from.index(), to.index()));
        }
    });

    if !back_edges.is_empty() {
        log::debug!("Reversing {} back edge(s) for layout", back_edges.len());
    }

    links
        .iter()
        .map(|&(source, target)| {
            if back_edges.contains(&(source, target)) {
                (target, source)
            } else {
                (source, target)
            }
        })
        .collect()
}

/// Longest-path ranking: every node sits one rank below its deepest predecessor
fn assign_ranks(dag: &DiGraph<(), ()>) -> Vec<usize> {
    let order = match toposort(dag, None) {
        Ok(order) => order,
        Err(cycle) => {
            log::warn!(
                "Layout graph still cyclic at slot {}, ranking in input order",
                cycle.node_id().index()
            );
            dag.node_indices().collect()
        }
    };

    let mut ranks = vec![0usize; dag.node_count()];
    for node in order {
        ranks[node.index()] = dag
            .neighbors_directed(node, Incoming)
            .map(|pred| ranks[pred.index()] + 1)
            .max()
            .unwrap_or(0);
    }
    ranks
}

fn order_layers(dag: &DiGraph<(), ()>, ranks: &[usize]) -> Vec<Vec<usize>> {
    let depth = ranks.iter().max().map_or(0, |max| max + 1);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); depth];
    for (slot, &rank) in ranks.iter().enumerate() {
        layers[rank].push(slot);
    }

    let mut best = layers.clone();
    let mut best_crossings = count_crossings(dag, &layers, ranks);

    for sweep in 0..ORDER_SWEEPS {
        if best_crossings == 0 {
            break;
        }

        if sweep % 2 == 0 {
            for rank in 1..depth {
                barycenter_sort(dag, &mut layers, rank, ranks, true);
            }
        } else {
            for rank in (0..depth.saturating_sub(1)).rev() {
                barycenter_sort(dag, &mut layers, rank, ranks, false);
            }
        }

        let crossings = count_crossings(dag, &layers, ranks);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.clone();
        }
    }

    best
}

/// Index of every slot within its own layer
fn layer_positions(layers: &[Vec<usize>], slot_count: usize) -> Vec<usize> {
    let mut positions = vec![0usize; slot_count];
    for layer in layers {
        for (idx, &slot) in layer.iter().enumerate() {
            positions[slot] = idx;
        }
    }
    positions
}

/// Reorder one rank by the mean position of its neighbours in the
/// adjacent rank above (`downward`) or below
fn barycenter_sort(
    dag: &DiGraph<(), ()>,
    layers: &mut [Vec<usize>],
    rank: usize,
    ranks: &[usize],
    downward: bool,
) {
    let positions = layer_positions(layers, ranks.len());
    let (direction, reference_rank) = if downward {
        (Incoming, rank.checked_sub(1))
    } else {
        (Outgoing, Some(rank + 1))
    };
    let Some(reference_rank) = reference_rank else {
        return;
    };

    let mut keyed: Vec<(f64, usize, usize)> = layers[rank]
        .iter()
        .enumerate()
        .map(|(idx, &slot)| {
            let neighbours: Vec<f64> = dag
                .neighbors_directed(NodeIndex::new(slot), direction)
                .filter(|n| ranks[n.index()] == reference_rank)
                .map(|n| positions[n.index()] as f64)
                .collect();
            let barycenter = if neighbours.is_empty() {
                idx as f64
            } else {
                neighbours.iter().sum::<f64>() / neighbours.len() as f64
            };
            (barycenter, idx, slot)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    layers[rank] = keyed.into_iter().map(|(_, _, slot)| slot).collect();
}

/// Crossings between edges joining adjacent ranks
fn count_crossings(dag: &DiGraph<(), ()>, layers: &[Vec<usize>], ranks: &[usize]) -> usize {
    let positions = layer_positions(layers, ranks.len());
    let mut by_rank: Vec<Vec<(usize, usize)>> = vec![Vec::new(); layers.len()];

    for edge in dag.edge_references() {
        let (source, target) = (edge.source().index(), edge.target().index());
        if ranks[target] == ranks[source] + 1 {
            by_rank[ranks[source]].push((positions[source], positions[target]));
        }
    }

    let mut crossings = 0;
    for pairs in &by_rank {
        for (i, &(a1, b1)) in pairs.iter().enumerate() {
            for &(a2, b2) in &pairs[i + 1..] {
                if (a1 < a2 && b1 > b2) || (a1 > a2 && b1 < b2) {
                    crossings += 1;
                }
            }
        }
    }
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StyleClass;

    fn node(id: &str) -> GraphNode {
        GraphNode::new(id, String::new(), StyleClass::Default)
    }

    fn positions(
        ids: &[&str],
        links: &[(&str, &str)],
        direction: LayoutDirection,
    ) -> HashMap<String, Position> {
        let nodes: Vec<GraphNode> = ids.iter().map(|id| node(id)).collect();
        let edges: Vec<GraphEdge> = links.iter().map(|(s, t)| GraphEdge::new(s, t)).collect();
        layout_graph(&nodes, &edges, direction)
            .into_iter()
            .map(|n| (n.id, n.position))
            .collect()
    }

    #[test]
    fn test_chain_top_to_bottom() {
        let p = positions(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C")],
            LayoutDirection::TopToBottom,
        );
        assert!(p["A"].y < p["B"].y);
        assert!(p["B"].y < p["C"].y);
        assert_eq!(p["A"].x, p["B"].x);
        assert_eq!(p["A"].y, 0.0);
        assert_eq!(p["B"].y, 42.0 + DEFAULT_RANK_SEP);
    }

    #[test]
    fn test_chain_left_to_right() {
        let p = positions(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C")],
            LayoutDirection::LeftToRight,
        );
        assert!(p["A"].x < p["B"].x);
        assert!(p["B"].x < p["C"].x);
        assert_eq!(p["A"].y, p["C"].y);
        assert_eq!(p["B"].x, 150.0 + DEFAULT_RANK_SEP);
    }

    #[test]
    fn test_siblings_do_not_overlap() {
        let p = positions(
            &["root", "a", "b", "c"],
            &[("root", "a"), ("root", "b"), ("root", "c")],
            LayoutDirection::TopToBottom,
        );
        let mut xs: Vec<f64> = ["a", "b", "c"].iter().map(|id| p[*id].x).collect();
        xs.sort_by(|a, b| a.total_cmp(b));
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= 150.0 + DEFAULT_NODE_SEP);
        }
        assert_eq!(p["a"].y, p["b"].y);
    }

    #[test]
    fn test_deterministic() {
        let ids = ["a", "b", "c", "d", "e", "f"];
        let links = [("a", "d"), ("b", "d"), ("c", "e"), ("a", "f"), ("d", "f"), ("e", "f")];
        let first = positions(&ids, &links, LayoutDirection::TopToBottom);
        let second = positions(&ids, &links, LayoutDirection::TopToBottom);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_is_laid_out() {
        let p = positions(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("C", "A")],
            LayoutDirection::TopToBottom,
        );
        assert_eq!(p.len(), 3);
        assert!(p["A"].y < p["B"].y);
        assert!(p["B"].y < p["C"].y);
    }

    #[test]
    fn test_dangling_and_self_edges_ignored() {
        let p = positions(
            &["A", "B"],
            &[("A", "ghost"), ("A", "A"), ("A", "B")],
            LayoutDirection::TopToBottom,
        );
        assert_eq!(p.len(), 2);
        assert!(p["A"].y < p["B"].y);
    }

    #[test]
    fn test_duplicate_ids_share_position() {
        let nodes = vec![node("A"), node("B"), node("A")];
        let edges = vec![GraphEdge::new("A", "B")];
        let laid = layout_graph(&nodes, &edges, LayoutDirection::TopToBottom);
        assert_eq!(laid.len(), 3);
        assert_eq!(laid[0].position, laid[2].position);
    }

    #[test]
    fn test_empty_input() {
        assert!(layout_graph(&[], &[], LayoutDirection::LeftToRight).is_empty());
    }

    #[test]
    fn test_crossings_resolved() {
        // a->d and b->c cross when ranks are kept in input order
        let p = positions(
            &["a", "b", "c", "d"],
            &[("a", "d"), ("b", "c")],
            LayoutDirection::TopToBottom,
        );
        assert_eq!(p["a"].x < p["b"].x, p["d"].x < p["c"].x);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("tb".parse::<LayoutDirection>(), Ok(LayoutDirection::TopToBottom));
        assert_eq!("LR".parse::<LayoutDirection>(), Ok(LayoutDirection::LeftToRight));
        assert!("diagonal".parse::<LayoutDirection>().is_err());
    }
}
