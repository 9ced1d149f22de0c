//! UI rendering module for Skycast
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. Formatting helpers shared by
//! more than one screen live here.

pub mod detail;
pub mod favorites;
pub mod help_overlay;
pub mod search;
pub mod widgets;

pub use detail::render as render_detail;
pub use favorites::render_favorites;
pub use help_overlay::render as render_help_overlay;
pub use search::render_search;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;

/// Condition code to icon mapping
pub fn condition_icon(code: i64) -> &'static str {
    match code {
        1000 | 1100 => "\u{2600}",                 // ☀
        1101 => "\u{26C5}",                        // ⛅
        1102 | 1001 => "\u{2601}",                 // ☁
        2000 | 2100 => "\u{1F32B}",                // 🌫
        4000 | 4200 => "\u{1F326}",                // 🌦
        4001 | 4201 => "\u{1F327}",                // 🌧
        5000 | 5001 | 5100 | 5101 => "\u{2744}",   // ❄
        6000 | 6001 | 6200 | 6201 => "\u{1F327}",  // 🌧
        7000 | 7101 | 7102 => "\u{2744}",          // ❄
        8000 => "\u{26C8}",                        // ⛈
        _ => "?",
    }
}

/// Color for temperature (warmer = more red, cooler = more blue)
pub fn temperature_color(temp: f64) -> Color {
    if temp >= 86.0 {
        Color::Red
    } else if temp >= 77.0 {
        Color::LightRed
    } else if temp >= 68.0 {
        Color::Yellow
    } else if temp >= 59.0 {
        Color::Green
    } else if temp >= 50.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

/// Formats a "YYYY-MM-DD" date as "MM/DD/YYYY"
///
/// Anything that does not split into three parts is shown as-is; the
/// parser already guarantees a plain string here.
pub fn format_date(date: &str) -> String {
    let mut parts = date.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(year), Some(month), Some(day)) => format!("{month}/{day}/{year}"),
        _ => date.to_string(),
    }
}

/// Formats an ISO timestamp as "HH:MM"
///
/// The "N/A" placeholder (and any other value without a time portion)
/// passes through unchanged.
pub fn format_time(timestamp: &str) -> String {
    match timestamp.split_once('T') {
        Some((_, time)) => time.get(..5).unwrap_or(time).to_string(),
        None => timestamp.to_string(),
    }
}

/// Helper function to create a centered rect
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
