//! Task list -> laid out graph snapshot

use super::graph::detail_url;
use super::histogram::TOTAL_KEY;
use super::layout::layout_graph;
use super::{GraphEdge, GraphNode, LayoutDirection, StateHistogram, StyleClass, Task};
use serde::Serialize;
use std::collections::HashSet;

/// Everything derived from one ingestion of the task list
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub histogram: StateHistogram,
}

impl GraphSnapshot {
    /// Edges whose target has no node in the snapshot
    pub fn dangling_edges(&self) -> usize {
        count_dangling(&self.nodes, &self.edges)
    }
}

/// Edges pointing at a node id that is not present
pub fn count_dangling(nodes: &[GraphNode], edges: &[GraphEdge]) -> usize {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    edges
        .iter()
        .filter(|e| !ids.contains(e.target.as_str()))
        .count()
}

/// Build nodes, edges and the state histogram from `tasks`, then lay the
/// graph out top-to-bottom. Detail links are rooted at `detail_base`.
pub fn transform(tasks: &[Task], detail_base: &str) -> GraphSnapshot {
    let mut histogram = StateHistogram::new();
    let mut nodes = Vec::with_capacity(tasks.len());
    let mut edges = Vec::new();

    for task in tasks {
        let state = task.state();
        histogram.increment(state.histogram_key());

        nodes.push(GraphNode::new(
            &task.name,
            detail_url(detail_base, &task.name),
            StyleClass::for_state(&state),
        ));

        for dependant in &task.dependants {
            edges.push(GraphEdge::new(&task.name, dependant));
        }
    }

    histogram.set(TOTAL_KEY, tasks.len());

    let nodes = layout_graph(&nodes, &edges, LayoutDirection::TopToBottom);

    let snapshot = GraphSnapshot {
        nodes,
        edges,
        histogram,
    };

    let dangling = snapshot.dangling_edges();
    if dangling > 0 {
        log::debug!("{} edge(s) point at tasks missing from the list", dangling);
    }

    snapshot
}
