//! Recipebox TUI - Terminal client for the recipe service
//!
//! Built with Ratatui and crossterm.

mod app;
mod config;
mod forms;
mod handlers;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use recipebox_core::{Api, HttpClient, MemoryBackend};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use app::{App, AppState};
use config::Config;

/// Recipebox TUI - browse, save and share recipes from the terminal
#[derive(Parser, Debug)]
#[command(name = "recipebox")]
#[command(about = "A terminal client for browsing, saving and uploading recipes")]
struct Args {
    /// Path to a config file (defaults to ~/.config/recipebox/recipebox.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL serving /recipes, /albums and /auth
    #[arg(long)]
    api_url: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run against built-in sample data instead of the remote service
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let writer = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("recipebox_tui=info".parse()?),
        )
        .with_writer(writer)
        .with_ansi(args.log_file.is_none())
        .init();

    let mut config = Config::load(args.config.clone())?;
    if let Some(base) = &args.api_url {
        config.override_api_base(base);
    }

    let api: Box<dyn Api> = if args.demo {
        tracing::info!("Starting Recipebox TUI with sample data");
        Box::new(MemoryBackend::demo())
    } else {
        tracing::info!("Starting Recipebox TUI against {}", config.api.recipes_url);
        Box::new(HttpClient::new(&config.api)?)
    };

    let mut app = App::new(api, config);
    app.start();

    #[cfg(debug_assertions)]
    {
        let _ = dotenvy::from_filename(".env.dev");
        if let (Ok(username), Ok(password)) = (
            std::env::var("RECIPEBOX_USERNAME"),
            std::env::var("RECIPEBOX_PASSWORD"),
        ) {
            tracing::info!("Found RECIPEBOX_USERNAME in env, attempting auto-login");
            app.auto_login(&username, &password);
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let frame_interval = app.config.frame_interval();
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll until the next carousel frame is due
        let timeout = frame_interval.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handlers::handle_key(app, key) {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= frame_interval {
            app.tick(last_tick.elapsed());
            last_tick = Instant::now();
        }

        // Check if we should quit
        if matches!(app.state, AppState::Quit) {
            break;
        }
    }

    Ok(())
}
