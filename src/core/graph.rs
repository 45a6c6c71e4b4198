//! Derived graph model - typed nodes and edges built from the task list

use super::StyleClass;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Node type tag carried by every task node
pub const TASK_NODE_KIND: &str = "task-node";

/// Fixed node box width in world units
pub const NODE_WIDTH: f64 = 150.0;

/// Fixed node box height in world units
pub const NODE_HEIGHT: f64 = 42.0;

/// Top-left corner of a node box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
        }
    }
}

/// Data rendered inside a node box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePayload {
    pub name: String,
    pub detail_url: String,
    pub style_class: StyleClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: String,
    pub position: Position,
    pub size: Size,
    /// Shared so that relayout keeps payload identity
    pub payload: Arc<NodePayload>,
}

impl GraphNode {
    pub fn new(name: &str, detail_url: String, style_class: StyleClass) -> Self {
        Self {
            id: name.to_string(),
            kind: TASK_NODE_KIND.to_string(),
            position: Position::default(),
            size: Size::default(),
            payload: Arc::new(NodePayload {
                name: name.to_string(),
                detail_url,
                style_class,
            }),
        }
    }

    /// Copy of this node moved to `position`; payload is shared, not cloned
    pub fn at(&self, position: Position) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Centre of the box
    pub fn center(&self) -> (f64, f64) {
        (
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Inbound connection anchor (top centre)
    pub fn inbound_anchor(&self) -> (f64, f64) {
        (self.position.x + self.size.width / 2.0, self.position.y)
    }

    /// Outbound connection anchor (bottom centre)
    pub fn outbound_anchor(&self) -> (f64, f64) {
        (
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub animated: bool,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: format!("{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            animated: true,
        }
    }
}

/// Link to the PNC build detail page of a task
pub fn detail_url(base: &str, name: &str) -> String {
    format!("{}/pnc-web/#/builds/{}", base.trim_end_matches('/'), name)
}
