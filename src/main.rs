//! Skycast - City weather search in the terminal
//!
//! A terminal UI application that resolves free-text city searches through
//! autocomplete and geocoding, then displays current weather and the daily
//! forecast for the chosen place.

mod app;
mod cli;
mod data;
mod favorites;
mod search;
mod ui;

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Screen};
use cli::{Cli, StartupConfig};
use data::ApiClient;
use favorites::StringListStore;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Initializes file logging when RUST_LOG is set
///
/// Logs go to a file in the platform cache directory; a layer writing to
/// stderr would paint over the alternate screen.
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let Some(project_dirs) = ProjectDirs::from("", "", "skycast") else {
        return;
    };
    if std::fs::create_dir_all(project_dirs.cache_dir()).is_err() {
        return;
    }
    let log_path = project_dirs.cache_dir().join("skycast.log");
    let Ok(log_file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    else {
        return;
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();
}

/// Renders the UI based on the current screen, with overlays on top
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.screen {
        Screen::Search => ui::render_search(frame, app),
        Screen::Detail => ui::render_detail(frame, app),
        Screen::Favorites => ui::render_favorites(frame, app),
    }

    if app.loading {
        render_fetching(frame);
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a small centered overlay while a weather fetch is in flight
fn render_fetching(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::Alignment,
        style::{Color, Style},
        widgets::{Block, Borders, Clear, Paragraph},
    };

    let overlay_area = ui::centered_rect(26, 3, frame.area());
    frame.render_widget(Clear, overlay_area);

    let fetching_text = Paragraph::new("Fetching weather...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    frame.render_widget(fetching_text, overlay_area);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reject bad arguments before touching the terminal
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app instance and run the startup fetch, if any
    let mut app = App::new(Arc::new(ApiClient::new()), StringListStore::new(), config);
    app.bootstrap();

    // Main event loop
    loop {
        // Render UI
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Apply completions from background tasks
        app.poll_messages();

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
