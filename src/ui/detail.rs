//! Weather detail screen UI
//!
//! Renders the full view for one location: current conditions, the metrics
//! grid, the scrollable daily forecast, and the temperature chart in its
//! collapsed or expanded form.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use chrono::Local;

use super::widgets::temp_chart::{range_rows, TempSparkline};
use super::{condition_icon, format_date, format_time, temperature_color};
use crate::app::App;
use crate::data::{condition_label, WeatherSnapshot};

/// Color scheme for the detail view
mod colors {
    use ratatui::style::Color;

    /// Section headers
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    /// Unknown/unavailable data (gray)
    pub const UNKNOWN: Color = Color::DarkGray;
    /// Favorite star
    pub const STAR: Color = Color::Yellow;
}

/// Renders the weather detail screen
///
/// # Arguments
/// * `frame` - The ratatui frame to render into
/// * `app` - The application state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let Some(weather) = &app.weather else {
        render_no_data(frame, area);
        return;
    };

    // Star the title when the displayed city is a favorite
    let title = if app.displayed_is_favorite() {
        format!(" {} \u{2605} ", weather.display_name)
    } else {
        format!(" {} ", weather.display_name)
    };

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            title,
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    // Forecast length is provider-controlled and unbounded
    let chart_height: u16 = if app.chart_expanded {
        u16::try_from(weather.forecast.len())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    } else {
        3
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // Current conditions
            Constraint::Length(5),            // Metrics grid
            Constraint::Min(3),               // Forecast table
            Constraint::Length(chart_height), // Temperature chart
            Constraint::Length(1),            // Footer
        ])
        .split(inner_area);

    render_current(frame, chunks[0], weather);
    render_metrics(frame, chunks[1], weather);
    render_forecast(frame, chunks[2], weather, app.forecast_scroll);
    render_chart(frame, chunks[3], weather, app.chart_expanded);
    render_footer(frame, chunks[4], app, weather);
}

/// Renders the placeholder when no weather has been fetched yet
fn render_no_data(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Percentage(45),
        ])
        .split(block.inner(area));
    frame.render_widget(block, area);

    let message = Paragraph::new("No weather loaded - press s to search")
        .style(Style::default().fg(colors::UNKNOWN))
        .alignment(Alignment::Center);
    frame.render_widget(message, chunks[1]);
}

/// Renders the big current-conditions line
fn render_current(frame: &mut Frame, area: Rect, weather: &WeatherSnapshot) {
    let icon = condition_icon(weather.condition_code);
    let label = condition_label(weather.condition_code);

    let lines = vec![
        Line::from(vec![
            Span::raw(format!("{}  ", icon)),
            Span::styled(
                format!("{:.0}\u{00B0}F", weather.temperature),
                Style::default()
                    .fg(temperature_color(weather.temperature))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", label),
                Style::default().fg(colors::PRIMARY),
            ),
        ]),
        Line::from(""),
    ];

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, area);
}

/// Renders the two-column metrics grid
fn render_metrics(frame: &mut Frame, area: Rect, weather: &WeatherSnapshot) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = vec![
        Line::from(Span::styled(
            "CONDITIONS",
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        )),
        metric_line("Humidity", format!("{:.0}%", weather.humidity)),
        metric_line("Wind", format!("{:.0} mph", weather.wind_speed)),
        metric_line("Visibility", format!("{:.0} mi", weather.visibility)),
        metric_line("Pressure", format!("{:.2} inHg", weather.pressure)),
    ];

    let right = vec![
        Line::from(""),
        metric_line("Cloud Cover", format!("{:.0}%", weather.cloud_cover)),
        metric_line(
            "Precipitation",
            format!("{:.0}%", weather.precipitation_probability),
        ),
        metric_line("UV Index", format!("{:.0}", weather.uv_index)),
    ];

    frame.render_widget(Paragraph::new(left), columns[0]);
    frame.render_widget(Paragraph::new(right), columns[1]);
}

/// Builds a "Label: value" metric line
fn metric_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::styled(value, Style::default().fg(colors::PRIMARY)),
    ])
}

/// Renders the daily forecast table with the current scroll offset
fn render_forecast(frame: &mut Frame, area: Rect, weather: &WeatherSnapshot, scroll: u16) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(
        "FORECAST",
        Style::default()
            .fg(colors::HEADER)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, chunks[0]);

    if weather.forecast.is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "No forecast available",
            Style::default().fg(colors::UNKNOWN),
        )));
        frame.render_widget(placeholder, chunks[1]);
        return;
    }

    let rows: Vec<Line> = weather.forecast.iter().map(forecast_row).collect();
    let paragraph = Paragraph::new(rows).scroll((scroll, 0));
    frame.render_widget(paragraph, chunks[1]);
}

/// Builds one forecast table row
fn forecast_row(day: &crate::data::ForecastDay) -> Line<'static> {
    let label = format!("{} {}", condition_icon(day.condition_code), condition_label(day.condition_code));
    Line::from(vec![
        Span::styled(
            format!("{:<12}", format_date(&day.date)),
            Style::default().fg(colors::PRIMARY),
        ),
        Span::styled(format!("{:<18}", label), Style::default().fg(colors::SECONDARY)),
        Span::styled(
            format!("{:>4.0}\u{00B0}", day.temp_min),
            Style::default().fg(temperature_color(day.temp_min)),
        ),
        Span::styled(
            format!("{:>5.0}\u{00B0}", day.temp_max),
            Style::default().fg(temperature_color(day.temp_max)),
        ),
        Span::styled(
            format!("  \u{2191}{}", format_time(&day.sunrise_time)),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::styled(
            format!(" \u{2193}{}", format_time(&day.sunset_time)),
            Style::default().fg(colors::SECONDARY),
        ),
    ])
}

/// Renders the temperature chart in its collapsed or expanded form
fn render_chart(frame: &mut Frame, area: Rect, weather: &WeatherSnapshot, expanded: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(
        "TEMPERATURE",
        Style::default()
            .fg(colors::HEADER)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, chunks[0]);

    if weather.forecast.is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "No forecast available",
            Style::default().fg(colors::UNKNOWN),
        )));
        frame.render_widget(placeholder, chunks[1]);
        return;
    }

    if expanded {
        let rows = range_rows(&weather.forecast, chunks[1].width as usize);
        frame.render_widget(Paragraph::new(rows), chunks[1]);
    } else {
        frame.render_widget(TempSparkline::new(&weather.forecast), chunks[1]);
    }

    let hint = if expanded { "[c] collapse" } else { "[c] expand" };
    let hint_line = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(colors::SECONDARY),
    )));
    frame.render_widget(hint_line, chunks[2]);
}

/// Renders the footer: status line, or key hints with data freshness
fn render_footer(frame: &mut Frame, area: Rect, app: &App, weather: &WeatherSnapshot) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(colors::STAR),
        )),
        None => {
            let updated = weather
                .fetched_at
                .with_timezone(&Local)
                .format("%H:%M")
                .to_string();
            Line::from(vec![
                Span::styled("f", Style::default().fg(colors::STAR)),
                Span::raw(" Favorite  "),
                Span::styled("c", Style::default().fg(colors::STAR)),
                Span::raw(" Chart  "),
                Span::styled("\u{2191}/\u{2193}", Style::default().fg(colors::STAR)),
                Span::raw(" Scroll  "),
                Span::styled("s", Style::default().fg(colors::STAR)),
                Span::raw(" Search  "),
                Span::styled("Tab", Style::default().fg(colors::STAR)),
                Span::raw(" Favorites  "),
                Span::styled("q", Style::default().fg(colors::STAR)),
                Span::raw(" Quit"),
                Span::styled(
                    format!(" \u{2502} Updated {}", updated),
                    Style::default().fg(colors::UNKNOWN),
                ),
            ])
        }
    };

    let paragraph = Paragraph::new(line).style(Style::default().fg(colors::UNKNOWN));
    frame.render_widget(paragraph, area);
}
