//! pncview - PNC task graph dashboard
//!
//! Fetches the task list of a PNC build from `/rest/tasks`, turns it into a
//! laid out dependency graph and renders it in the terminal with
//! status-colored nodes and a per-state count table.

pub mod app;
pub mod config;
pub mod core;
pub mod fetch;
pub mod ui;

// Re-exports
pub use app::{App, GraphEvent};
pub use config::Config;
pub use core::{
    layout_graph, transform, GraphEdge, GraphNode, GraphSnapshot, LayoutDirection, StateHistogram,
    StyleClass, Task, TaskState,
};
pub use fetch::{fetch_snapshot, FetchError, FileTaskSource, HttpTaskSource, TaskSource};

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
