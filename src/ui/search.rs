//! Search screen rendering
//!
//! Renders the free-text city search: the input box, the autocomplete
//! dropdown, and a footer with key hints or a transient status line.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Renders the search screen
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state containing the query and predictions
pub fn render_search(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input box
            Constraint::Min(3),    // Prediction dropdown
            Constraint::Length(1), // Status / help text
        ])
        .split(area);

    render_input(frame, app, chunks[0]);
    render_predictions(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

/// Renders the query input box with a block cursor
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Search City ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = Line::from(vec![
        Span::styled(app.query.clone(), Style::default().fg(Color::White)),
        Span::styled("\u{258C}", Style::default().fg(Color::Cyan)),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

/// Renders the prediction dropdown or the appropriate placeholder
fn render_predictions(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.searching {
        vec![Line::from(Span::styled(
            "Searching...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else if !app.predictions.is_empty() {
        app.predictions
            .iter()
            .enumerate()
            .map(|(index, prediction)| {
                let is_selected = index == app.selected_prediction;
                let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space
                let name_style = if is_selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(cursor, Style::default().fg(Color::Cyan)),
                    Span::styled(prediction.description.clone(), name_style),
                ])
            })
            .collect()
    } else if !app.query.is_empty() {
        vec![Line::from(Span::styled(
            "No matches",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        vec![Line::from(Span::styled(
            "Start typing to search for a city",
            Style::default().fg(Color::DarkGray),
        ))]
    };

    let block = Block::default()
        .title(" Matches ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

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
            Span::raw(" Select  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Fetch  "),
            Span::styled("Ctrl-L", Style::default().fg(Color::Yellow)),
            Span::raw(" My location  "),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" Favorites  "),
            Span::styled("F1", Style::default().fg(Color::Yellow)),
            Span::raw(" Help  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ]),
    };

    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
