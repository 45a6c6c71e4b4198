//! Task node box - label, link and connection anchors
//!
//! Labels are prepared once per payload and cached; a node is only rebuilt
//! when its payload `Arc` changes, so relayouts that merely move nodes reuse
//! the prepared view.

use crate::core::{GraphNode, NodePayload, StyleClass};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::canvas::{Context, Points, Rectangle};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Longest label printed inside a box
const LABEL_MAX_CHARS: usize = 13;

const ANCHOR_COLOR: Color = Color::Cyan;
const SELECTED_COLOR: Color = Color::Yellow;

/// Prepared rendering of one task node
#[derive(Debug, Clone)]
pub struct NodeView {
    payload: Arc<NodePayload>,
    label: String,
    style: Style,
    border: Color,
}

impl NodeView {
    pub fn new(payload: Arc<NodePayload>) -> Self {
        let label = truncate_label(&payload.name);
        let style = payload
            .style_class
            .style()
            .add_modifier(Modifier::UNDERLINED);
        let border = payload.style_class.border_color();

        Self {
            payload,
            label,
            style,
            border,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn style_class(&self) -> StyleClass {
        self.payload.style_class
    }

    /// Where the label links to
    pub fn detail_url(&self) -> &str {
        &self.payload.detail_url
    }

    /// Draw the box of `node` into a canvas whose y axis points up
    pub fn draw(&self, ctx: &mut Context, node: &GraphNode, selected: bool) {
        let (x, y) = (node.position.x, node.position.y);
        let (w, h) = (node.size.width, node.size.height);

        ctx.draw(&Rectangle {
            x,
            y: -(y + h),
            width: w,
            height: h,
            color: if selected { SELECTED_COLOR } else { self.border },
        });

        let (in_x, in_y) = node.inbound_anchor();
        let (out_x, out_y) = node.outbound_anchor();
        ctx.draw(&Points {
            coords: &[(in_x, -in_y), (out_x, -out_y)],
            color: ANCHOR_COLOR,
        });

        ctx.print(
            x + w * 0.08,
            -(y + h / 2.0),
            Line::styled(self.label.clone(), self.style),
        );
    }
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() <= LABEL_MAX_CHARS {
        return name.to_string();
    }
    let mut label: String = name.chars().take(LABEL_MAX_CHARS - 1).collect();
    label.push('…');
    label
}

/// Node views keyed by node id
#[derive(Debug, Default)]
pub struct NodeViewCache {
    views: HashMap<String, NodeView>,
    builds: usize,
}

impl NodeViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cache in line with `nodes`, rebuilding only views whose
    /// payload is not the very same allocation as before. The first node
    /// with a given id owns its view; later duplicates are skipped.
    pub fn sync(&mut self, nodes: &[GraphNode]) {
        let mut current: HashSet<&str> = HashSet::with_capacity(nodes.len());

        for node in nodes {
            if !current.insert(node.id.as_str()) {
                continue;
            }

            let fresh = self
                .views
                .get(&node.id)
                .map_or(true, |view| !Arc::ptr_eq(&view.payload, &node.payload));

            if fresh {
                self.views
                    .insert(node.id.clone(), NodeView::new(Arc::clone(&node.payload)));
                self.builds += 1;
            }
        }

        self.views.retain(|id, _| current.contains(id.as_str()));
    }

    pub fn get(&self, id: &str) -> Option<&NodeView> {
        self.views.get(id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Number of views built since creation
    pub fn builds(&self) -> usize {
        self.builds
    }
}
