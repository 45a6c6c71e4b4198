//! Application state - owns the graph and reacts to load results and keys

use crate::config::Config;
use crate::core::{
    count_dangling, layout_graph, GraphEdge, GraphNode, GraphSnapshot, LayoutDirection,
    StateHistogram,
};
use crate::fetch::{fetch_snapshot, FetchError, TaskSource};
use crate::ui::{NodeViewCache, Viewport};
use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use std::process::{Command, ExitStatus};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Result of a background graph load
#[derive(Debug)]
pub enum GraphEvent {
    Loaded(GraphSnapshot),
    Failed(FetchError),
}

/// Application state
pub struct App {
    config: Config,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    histogram: StateHistogram,
    direction: LayoutDirection,
    /// Direction applied once the first graph lands
    preferred_direction: LayoutDirection,
    fit_pending: bool,
    selected: Option<usize>,
    load_started: bool,
    cancel: CancellationToken,
    event_tx: mpsc::UnboundedSender<GraphEvent>,
    event_rx: mpsc::UnboundedReceiver<GraphEvent>,
    pub viewport: Viewport,
    pub node_views: NodeViewCache,
    pub source_label: String,
    pub loaded_at: Option<DateTime<Local>>,
    pub should_quit: bool,
}

impl App {
    /// Create an app with empty graph state
    pub fn new(config: Config) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            histogram: StateHistogram::new(),
            direction: LayoutDirection::TopToBottom,
            preferred_direction: LayoutDirection::TopToBottom,
            fit_pending: false,
            selected: None,
            load_started: false,
            cancel: CancellationToken::new(),
            event_tx,
            event_rx,
            viewport: Viewport::default(),
            node_views: NodeViewCache::new(),
            source_label: String::new(),
            loaded_at: None,
            should_quit: false,
        }
    }

    /// Lay the graph out in `direction` as soon as it is loaded
    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.preferred_direction = direction;
        self
    }

    pub fn set_nodes(&mut self, nodes: Vec<GraphNode>) {
        self.node_views.sync(&nodes);
        self.selected = match self.selected {
            _ if nodes.is_empty() => None,
            Some(idx) => Some(idx.min(nodes.len() - 1)),
            None => None,
        };
        self.nodes = nodes;
    }

    pub fn set_edges(&mut self, edges: Vec<GraphEdge>) {
        self.edges = edges;
    }

    pub fn set_histogram(&mut self, histogram: StateHistogram) {
        self.histogram = histogram;
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn histogram(&self) -> &StateHistogram {
        &self.histogram
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    pub fn fit_pending(&self) -> bool {
        self.fit_pending
    }

    pub fn dangling_edges(&self) -> usize {
        count_dangling(&self.nodes, &self.edges)
    }

    /// Copy of the current graph state
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            histogram: self.histogram.clone(),
        }
    }

    /// Token cancelled when this app goes away
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn begin_load(&mut self, label: String) -> bool {
        if self.load_started {
            log::warn!("Graph already loaded from {}, ignoring reload", self.source_label);
            return false;
        }
        self.load_started = true;
        self.source_label = label;
        true
    }

    /// Fetch and transform in the background. Runs at most once per app;
    /// the result arrives through [`App::process_events`]. A load still in
    /// flight when the app quits or is dropped never reports back.
    pub fn spawn_load<S>(&mut self, source: S)
    where
        S: TaskSource + Send + Sync + 'static,
    {
        if !self.begin_load(source.describe()) {
            return;
        }

        let token = self.cancel.child_token();
        let event_tx = self.event_tx.clone();
        let detail_base = self.config.pnc_base_url.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("Graph load cancelled");
                }
                result = fetch_snapshot(&source, &detail_base) => {
                    if token.is_cancelled() {
                        return;
                    }
                    let event = match result {
                        Ok(snapshot) => GraphEvent::Loaded(snapshot),
                        Err(e) => GraphEvent::Failed(e),
                    };
                    let _ = event_tx.send(event);
                }
            }
        });
    }

    /// Fetch and transform in place. Same once-only rule as [`App::spawn_load`].
    pub async fn load_graph<S: TaskSource>(&mut self, source: &S) {
        if !self.begin_load(source.describe()) {
            return;
        }

        let result = fetch_snapshot(source, &self.config.pnc_base_url).await;
        self.handle_event(match result {
            Ok(snapshot) => GraphEvent::Loaded(snapshot),
            Err(e) => GraphEvent::Failed(e),
        });
    }

    /// Apply load results that have arrived (non-blocking)
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: GraphEvent) {
        if self.cancel.is_cancelled() {
            return;
        }

        match event {
            GraphEvent::Loaded(snapshot) => self.apply_snapshot(snapshot),
            GraphEvent::Failed(e) => {
                // State stays as it was; the view keeps showing it
                log::error!("Failed to load task graph from {}: {}", self.source_label, e);
            }
        }
    }

    /// Replace all graph state with a freshly derived snapshot
    pub fn apply_snapshot(&mut self, snapshot: GraphSnapshot) {
        log::info!(
            "Loaded {} nodes, {} edges",
            snapshot.nodes.len(),
            snapshot.edges.len()
        );

        self.set_nodes(snapshot.nodes);
        self.set_edges(snapshot.edges);
        self.set_histogram(snapshot.histogram);
        self.direction = LayoutDirection::TopToBottom;
        self.loaded_at = Some(Local::now());
        self.fit_pending = true;

        if self.preferred_direction != self.direction {
            self.relayout(self.preferred_direction);
        }
    }

    /// Recompute positions of the current graph in `direction` and ask
    /// for the view to be fit on the next frame. Counts are left alone.
    pub fn relayout(&mut self, direction: LayoutDirection) {
        log::info!("Relayout {} ({} nodes)", direction, self.nodes.len());

        let nodes = layout_graph(&self.nodes, &self.edges, direction);
        let edges = std::mem::take(&mut self.edges);
        self.set_nodes(nodes);
        self.set_edges(edges);
        self.direction = direction;
        self.fit_pending = true;
    }

    /// Apply a pending fit for a diagram of the given size
    pub fn settle(&mut self, diagram: Rect) {
        if self.fit_pending {
            self.viewport.fit(&self.nodes, diagram.width, diagram.height);
            self.fit_pending = false;
        }
    }

    pub fn selected_node(&self) -> Option<&GraphNode> {
        self.selected.and_then(|idx| self.nodes.get(idx))
    }

    pub fn select_next(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(idx) => (idx + 1) % self.nodes.len(),
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.nodes.len() - 1,
            Some(idx) => idx - 1,
        });
    }

    /// Stop listening for load results
    pub fn quit(&mut self) {
        self.should_quit = true;
        self.cancel.cancel();
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('v') => self.relayout(LayoutDirection::TopToBottom),
            KeyCode::Char('h') => self.relayout(LayoutDirection::LeftToRight),
            KeyCode::Char('f') => self.fit_pending = true,
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewport.zoom_in(),
            KeyCode::Char('-') => self.viewport.zoom_out(),
            KeyCode::Left => self.viewport.pan(-4, 0),
            KeyCode::Right => self.viewport.pan(4, 0),
            KeyCode::Up => self.viewport.pan(0, -2),
            KeyCode::Down => self.viewport.pan(0, 2),
            KeyCode::Tab => self.select_next(),
            KeyCode::BackTab => self.select_prev(),
            KeyCode::Enter => self.open_selected(),
            _ => {}
        }
    }

    fn open_selected(&self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        let url = &node.payload.detail_url;
        log::info!("Opening {}", url);

        if let Err(e) = open_in_browser(url) {
            log::warn!("Failed to open {}: {}", url, e);
        }
    }

    /// Check if we should poll for input
    pub fn should_poll_input() -> Result<bool> {
        Ok(event::poll(Duration::from_millis(100))?)
    }

    /// Get keyboard event
    pub fn read_event() -> Result<Event> {
        Ok(event::read()?)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Hand a link to the platform opener without waiting for it
fn open_in_browser(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };

    let url = url.to_string();
    let reaper = spawn_reaped(command.arg(&url))?;
    thread::spawn(move || match reaper.join() {
        Ok(Ok(status)) if !status.success() => {
            log::warn!("Opener for {} exited with {}", url, status);
        }
        Ok(Err(e)) => log::warn!("Failed to wait for opener of {}: {}", url, e),
        _ => {}
    });
    Ok(())
}

/// Background wait on a spawned child, yielding its exit status
type Reaper = JoinHandle<std::io::Result<ExitStatus>>;

/// Spawn `command` and wait for it on a background thread so the child is
/// always reaped
fn spawn_reaped(command: &mut Command) -> std::io::Result<Reaper> {
    let mut child = command.spawn()?;
    Ok(thread::spawn(move || child.wait()))
}
