use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use portal_tui::app::App;
use portal_tui::clipboard::Osc52Clipboard;
use portal_tui::config::PortalConfig;
use portal_tui::controller::KeyController;
use ratatui::prelude::*;
use tracing::info;

/// How often the screen is redrawn while no key is pressed, so finished
/// requests and expired notifications show up.
const TICK: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    let config = PortalConfig::parse();
    init_tracing(&config)?;

    info!("portal starting");
    info!("api base url: {}", config.api_base_url);

    let controller = Arc::new(portal_tui::build_controller(
        &config,
        Arc::new(Osc52Clipboard),
    ));
    let app = App::new(Arc::clone(&controller), config.api_base_url.clone());

    run_tui(app, controller)
}

fn init_tracing(config: &PortalConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match &config.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init();
        }
    }
    Ok(())
}

fn run_tui(app: App, controller: Arc<KeyController>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app, controller);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    controller: Arc<KeyController>,
) -> Result<()> {
    tokio::spawn(app.mount().run(Arc::clone(&controller)));

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            break;
        }

        if let Some(command) = app.handle_key(key) {
            tokio::spawn(command.run(Arc::clone(&controller)));
        }
        if app.should_quit() {
            break;
        }
    }

    info!("portal exiting");
    Ok(())
}
