//! Favorites screen rendering
//!
//! Renders the stored city list with the prefetched weather summary for
//! each row, or a fetching placeholder while the batch is in flight.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{condition_icon, temperature_color};
use crate::app::App;
use crate::data::condition_label;

/// Renders the favorites screen
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state containing favorites and summaries
pub fn render_favorites(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Favorites list
            Constraint::Length(1), // Status / help text
        ])
        .split(area);

    render_list(frame, app, chunks[0]);
    render_footer(frame, app, chunks[1]);
}

/// Renders the favorites list content
fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.favorites.is_empty() {
        vec![Line::from(Span::styled(
            "No favorites yet - press f on a city's weather to add it",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.favorites
            .names()
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let is_selected = index == app.selected_favorite;
                let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space
                let name_style = if is_selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let mut spans = vec![
                    Span::styled(cursor, Style::default().fg(Color::Cyan)),
                    Span::styled(format!("{:<24}", name), name_style),
                    Span::raw(" "),
                ];

                let summary = app.summaries.get(index).and_then(|s| s.weather.as_ref());
                match summary {
                    Some(weather) => {
                        spans.push(Span::styled(
                            format!("{:>4.0}\u{00B0}F", weather.temperature),
                            Style::default().fg(temperature_color(weather.temperature)),
                        ));
                        spans.push(Span::raw(" "));
                        spans.push(Span::raw(condition_icon(weather.condition_code)));
                        spans.push(Span::raw(" "));
                        spans.push(Span::styled(
                            condition_label(weather.condition_code),
                            Style::default().fg(Color::Gray),
                        ));
                    }
                    None => {
                        spans.push(Span::styled(
                            "fetching...",
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                }

                Line::from(spans)
            })
            .collect()
    };

    let block = Block::default()
        .title(" Favorites ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Renders the status line, falling back to key hints
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(vec![
            Span::styled("\u{2191}/\u{2193}", Style::default().fg(Color::Yellow)),
            Span::raw(" Navigate  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Fetch  "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(" Remove  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Back  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ]),
    };

    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
