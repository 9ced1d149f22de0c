//! Forecast temperature chart widgets
//!
//! Two renderings of the same forecast: a one-line sparkline of daily highs
//! for the collapsed view, and per-day range bars for the expanded view.
//! Both scale against the coldest and hottest temperatures in the forecast.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::data::ForecastDay;
use crate::ui::{format_date, temperature_color};

/// Block characters for different temperature levels (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Returns the coldest low and hottest high across the forecast
fn bounds(forecast: &[ForecastDay]) -> (f64, f64) {
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    for day in forecast {
        low = low.min(day.temp_min);
        high = high.max(day.temp_max);
    }
    if low.is_finite() && high.is_finite() {
        (low, high)
    } else {
        (0.0, 1.0)
    }
}

/// Converts a temperature to a block character within the given bounds
fn level_block(value: f64, low: f64, high: f64) -> char {
    let span = high - low;
    let normalized = if span <= f64::EPSILON {
        // Flat forecast, show a mid-level block
        0.5
    } else {
        ((value - low) / span).clamp(0.0, 1.0)
    };
    let index = ((normalized * 7.0).round() as usize).min(7);
    BLOCKS[index]
}

/// A sparkline widget showing daily high temperatures across the forecast
pub struct TempSparkline<'a> {
    /// Forecast days, one block character per day
    forecast: &'a [ForecastDay],
    /// Style for the sparkline
    style: Style,
}

impl<'a> TempSparkline<'a> {
    pub fn new(forecast: &'a [ForecastDay]) -> Self {
        Self {
            forecast,
            style: Style::default().fg(Color::Cyan),
        }
    }

    #[allow(dead_code)]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl<'a> Widget for TempSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (low, high) = bounds(self.forecast);
        let width = area.width as usize;

        for (i, day) in self.forecast.iter().take(width).enumerate() {
            let block = level_block(day.temp_max, low, high);
            let x = area.x + i as u16;

            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(block).set_style(self.style);
            }
        }
    }
}

/// Builds one line per forecast day with a min-to-max range bar
///
/// The bar is positioned on a shared scale so a mild day reads as a short
/// bar near the middle and a swing day spans most of the width.
pub fn range_rows(forecast: &[ForecastDay], width: usize) -> Vec<Line<'static>> {
    let (low, high) = bounds(forecast);
    let span = (high - low).max(f64::EPSILON);
    // Date column, two temperature columns, and padding around the bar
    let bar_width = width.saturating_sub(26).max(10);

    forecast
        .iter()
        .map(|day| {
            let start = (((day.temp_min - low) / span) * (bar_width - 1) as f64).round() as usize;
            let end = (((day.temp_max - low) / span) * (bar_width - 1) as f64).round() as usize;
            let bar: String = (0..bar_width)
                .map(|i| if i >= start && i <= end { '\u{2588}' } else { '\u{2500}' })
                .collect();

            Line::from(vec![
                Span::styled(
                    format!("{:<11}", format_date(&day.date)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:>4.0}\u{00B0}", day.temp_min),
                    Style::default().fg(temperature_color(day.temp_min)),
                ),
                Span::raw(" "),
                Span::styled(bar, Style::default().fg(temperature_color(day.temp_max))),
                Span::raw(" "),
                Span::styled(
                    format!("{:>4.0}\u{00B0}", day.temp_max),
                    Style::default().fg(temperature_color(day.temp_max)),
                ),
            ])
        })
        .collect()
}
