//! Viewport - maps world coordinates of the laid out graph onto the terminal

use crate::core::GraphNode;

/// World units covered by one terminal column at zoom 1.0
pub const CELL_WIDTH: f64 = 10.0;

/// World units covered by one terminal row at zoom 1.0
pub const CELL_HEIGHT: f64 = 14.0;

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 2.0;
const ZOOM_STEP: f64 = 1.25;
const FIT_PADDING: f64 = 0.1;

/// Visible window onto the diagram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Canvas bounds for a drawing area of `cols` x `rows` cells.
    /// The canvas y axis points up, so world y is negated.
    pub fn bounds(&self, cols: u16, rows: u16) -> ([f64; 2], [f64; 2]) {
        let half_w = cols as f64 * CELL_WIDTH / self.zoom / 2.0;
        let half_h = rows as f64 * CELL_HEIGHT / self.zoom / 2.0;
        (
            [self.center_x - half_w, self.center_x + half_w],
            [-(self.center_y + half_h), -(self.center_y - half_h)],
        )
    }

    /// Centre on all nodes and zoom so that they fit
    pub fn fit(&mut self, nodes: &[GraphNode], cols: u16, rows: u16) {
        if nodes.is_empty() || cols == 0 || rows == 0 {
            *self = Self::default();
            return;
        }

        let min_x = nodes.iter().map(|n| n.position.x).fold(f64::INFINITY, f64::min);
        let min_y = nodes.iter().map(|n| n.position.y).fold(f64::INFINITY, f64::min);
        let max_x = nodes
            .iter()
            .map(|n| n.position.x + n.size.width)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_y = nodes
            .iter()
            .map(|n| n.position.y + n.size.height)
            .fold(f64::NEG_INFINITY, f64::max);

        let width = (max_x - min_x) * (1.0 + 2.0 * FIT_PADDING);
        let height = (max_y - min_y) * (1.0 + 2.0 * FIT_PADDING);

        let zoom_x = cols as f64 * CELL_WIDTH / width;
        let zoom_y = rows as f64 * CELL_HEIGHT / height;

        self.center_x = (min_x + max_x) / 2.0;
        self.center_y = (min_y + max_y) / 2.0;
        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Move by a number of terminal cells
    pub fn pan(&mut self, cols: i32, rows: i32) {
        self.center_x += cols as f64 * CELL_WIDTH / self.zoom;
        self.center_y += rows as f64 * CELL_HEIGHT / self.zoom;
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Position, StyleClass};

    fn node_at(x: f64, y: f64) -> GraphNode {
        GraphNode::new("n", String::new(), StyleClass::Default).at(Position::new(x, y))
    }

    #[test]
    fn test_fit_contains_all_nodes() {
        let nodes = vec![node_at(0.0, 0.0), node_at(800.0, 600.0)];
        let mut viewport = Viewport::default();
        viewport.fit(&nodes, 80, 24);

        let ([x0, x1], [y0, y1]) = viewport.bounds(80, 24);
        assert!(x0 <= 0.0 && x1 >= 950.0);
        // canvas y is negated world y
        assert!(y0 <= -642.0 && y1 >= 0.0);
    }

    #[test]
    fn test_fit_empty_resets() {
        let mut viewport = Viewport {
            center_x: 5.0,
            center_y: 5.0,
            zoom: 0.5,
        };
        viewport.fit(&[], 80, 24);
        assert_eq!(viewport, Viewport::default());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::default();
        for _ in 0..20 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom, MAX_ZOOM);
        for _ in 0..40 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_pan() {
        let mut viewport = Viewport::default();
        viewport.pan(2, -1);
        assert_eq!(viewport.center_x, 2.0 * CELL_WIDTH);
        assert_eq!(viewport.center_y, -CELL_HEIGHT);
    }
}
