//! Core engine - task model, graph derivation and layout

mod graph;
mod histogram;
mod layout;
mod pipeline;
mod style;
mod task;

pub use graph::{
    detail_url, GraphEdge, GraphNode, NodePayload, Position, Size, NODE_HEIGHT, NODE_WIDTH,
    TASK_NODE_KIND,
};
pub use histogram::{StateHistogram, TOTAL_KEY};
pub use layout::{layout_graph, LayeredLayout, LayoutDirection, LayoutEngine};
pub use pipeline::{count_dangling, transform, GraphSnapshot};
pub use style::StyleClass;
pub use task::{Task, TaskState, UNKNOWN_STATE};
