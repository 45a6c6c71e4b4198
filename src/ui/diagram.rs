//! Diagram surface - edges and task boxes on a braille canvas

use crate::app::App;
use crate::core::GraphNode;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders,
    },
    Frame,
};
use std::collections::HashMap;

const EDGE_COLOR: Color = Color::Gray;
const ANIMATED_EDGE_COLOR: Color = Color::Cyan;

/// Inner drawing area of the diagram block
pub fn diagram_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

pub fn render_diagram(f: &mut Frame, app: &App, area: Rect) {
    let inner = diagram_inner(area);
    let (x_bounds, y_bounds) = app.viewport.bounds(inner.width, inner.height);

    let title = format!(
        "Task graph ({}) | {} nodes, {} edges",
        app.direction().label(),
        app.nodes().len(),
        app.edges().len()
    );

    let nodes = app.nodes();
    let selected = app.selected_node().map(|n| n.id.as_str());

    // First node wins for duplicated ids
    let mut by_id: HashMap<&str, &GraphNode> = HashMap::new();
    for node in nodes {
        by_id.entry(node.id.as_str()).or_insert(node);
    }

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            // Dangling edges have no target box and are left undrawn
            for edge in app.edges() {
                let (Some(source), Some(target)) =
                    (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str()))
                else {
                    continue;
                };
                let (x1, y1) = source.outbound_anchor();
                let (x2, y2) = target.inbound_anchor();
                ctx.draw(&CanvasLine {
                    x1,
                    y1: -y1,
                    x2,
                    y2: -y2,
                    color: if edge.animated { ANIMATED_EDGE_COLOR } else { EDGE_COLOR },
                });
            }

            ctx.layer();

            for node in nodes {
                if let Some(view) = app.node_views.get(&node.id) {
                    view.draw(ctx, node, selected == Some(node.id.as_str()));
                }
            }

            if nodes.is_empty() {
                let [x0, x1] = x_bounds;
                let [y0, y1] = y_bounds;
                ctx.print(
                    (x0 + x1) / 2.0 - 40.0,
                    (y0 + y1) / 2.0,
                    Line::styled("(no tasks)", Style::default().fg(Color::DarkGray)),
                );
            }
        });

    f.render_widget(canvas, area);
}
