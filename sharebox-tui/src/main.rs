//! sharebox-tui: Terminal UI client for sharebox
//!
//! - Sign in / register
//! - Upload files, browse and bulk-delete them
//! - Issue, copy and revoke share links
//!
//! Usage: `sharebox-tui [route]`, e.g. `sharebox-tui /view/<file id>`.

mod app;
mod clipboard;
mod input;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sharebox_core::{Config, FileTokenStore, MemoryTokenStore, Route, Session, TokenStore};

use crate::app::{App, AppResult};
use crate::input::handle_key;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = Config::load().unwrap_or_default();

    // Initialize tracing to file (not stdout, would interfere with TUI)
    let log_file = config.tui.log_file.clone().unwrap_or_else(|| {
        dirs::cache_dir()
            .map(|d| d.join("sharebox").join("tui.log"))
            .unwrap_or_else(|| std::env::temp_dir().join("sharebox-tui.log"))
    });

    let log_dir = log_file
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(
        &log_dir,
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("sharebox-tui.log")),
    );

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharebox_tui=debug,sharebox_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(file_appender))
        .init();

    info!("Using API at {}", config.api.base_url);

    let store: Arc<dyn TokenStore> = match FileTokenStore::new() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("No data directory ({}), session will not persist", e);
            Arc::new(MemoryTokenStore::new())
        }
    };
    let session = Session::init(store);

    let initial = std::env::args().nth(1).map(|path| Route::parse(&path));
    let mouse = config.tui.mouse;

    // Create app
    let mut app = App::new(config, session, initial);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        // Apply results, redirects and mount effects before drawing
        app.tick();

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll with a timeout so spawned requests get to report back
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(app, key) {
                    AppResult::Continue => {}
                    AppResult::Quit => return Ok(()),
                }
            }
        }

        // Let spawned tasks progress between frames
        tokio::task::yield_now().await;
    }
}
