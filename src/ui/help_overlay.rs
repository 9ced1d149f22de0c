//! Help overlay showing all keybindings
//!
//! Renders a centered modal overlay with keyboard shortcuts.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let area = frame.area();

    // Calculate centered overlay area
    let overlay_width = 52;
    let overlay_height = 21;
    let overlay_area = centered_rect(overlay_width, overlay_height, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    // Build help content
    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Search",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        help_line("↑/↓", "Move prediction selection"),
        help_line("Enter", "Fetch the selected city"),
        help_line("Ctrl-L", "Weather for my location"),
        help_line("Esc", "Clear input / Quit when empty"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Weather",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        help_line("f", "Add/remove favorite"),
        help_line("c", "Expand/collapse chart"),
        help_line("↑/k, ↓/j", "Scroll forecast"),
        help_line("s, Esc", "Back to search"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Favorites",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        help_line("Tab", "Open favorites"),
        help_line("Enter", "Fetch the selected favorite"),
        help_line("d", "Remove the selected favorite"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, overlay_area);
}

/// Creates a help line with key and description
fn help_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
        Span::raw(description.to_string()),
    ])
}
