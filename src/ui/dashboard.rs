//! Dashboard view - direction controls, diagram and state counts

use super::diagram::{diagram_inner, render_diagram};
use crate::app::App;
use crate::core::{LayoutDirection, TOTAL_KEY};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

/// Width of the state count table
const TABLE_WIDTH: u16 = 30;

/// Dashboard view composing the whole screen
pub struct DashboardView;

impl DashboardView {
    /// Render the dashboard. Applies a pending fit first, since the
    /// diagram size is only known here.
    pub fn render(f: &mut Frame, app: &mut App) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header + controls
                Constraint::Min(6),    // Diagram + table
                Constraint::Length(3), // Footer
            ])
            .split(f.area());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(TABLE_WIDTH)])
            .split(chunks[1]);

        app.settle(diagram_inner(body[0]));

        Self::render_header(f, app, chunks[0]);
        render_diagram(f, app, body[0]);
        Self::render_histogram(f, app, body[1]);
        Self::render_footer(f, app, chunks[2]);
    }

    fn render_header(f: &mut Frame, app: &App, area: Rect) {
        let mut spans = vec![
            Span::styled(
                "PNC task graph",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" | {} | ", app.source_label)),
        ];

        let buttons = [
            ('v', LayoutDirection::TopToBottom),
            ('h', LayoutDirection::LeftToRight),
        ];
        for (key, direction) in buttons {
            let style = if app.direction() == direction {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Cyan)
            };
            spans.push(Span::styled(format!("[{}] {}", key, direction.label()), style));
            spans.push(Span::raw(" "));
        }

        let dangling = app.dangling_edges();
        if dangling > 0 {
            spans.push(Span::styled(
                format!("| {} unresolved dependant(s) ", dangling),
                Style::default().fg(Color::Yellow),
            ));
        }

        if let Some(loaded_at) = app.loaded_at {
            spans.push(Span::styled(
                format!("| loaded {}", loaded_at.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let header =
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn render_histogram(f: &mut Frame, app: &App, area: Rect) {
        let rows: Vec<Row> = app
            .histogram()
            .iter()
            .map(|(state, count)| {
                let style = if state == TOTAL_KEY {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(state.to_string()),
                    Cell::from(count.to_string()),
                ])
                .style(style)
            })
            .collect();

        let table = Table::new(rows, [Constraint::Min(16), Constraint::Length(8)])
            .header(
                Row::new(vec!["State", "Count"])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title("States"));

        f.render_widget(table, area);
    }

    fn render_footer(f: &mut Frame, app: &App, area: Rect) {
        let mut text = String::from(concat!(
            "q: Quit │ v/h: Layout │ ←↑↓→: Pan │ ",
            "+/-: Zoom │ f: Fit │ Tab: Select",
        ));

        if let Some(node) = app.selected_node() {
            text.push_str(&format!(" │ Enter: open {}", node.payload.detail_url));
        }

        let footer = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray));

        f.render_widget(footer, area);
    }
}
