use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
        EnableFocusChange, EnableMouseCapture,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use spectron::config::AppConfig;
use spectron::core::{events, logging};
use spectron::tui::app::AppState;
use spectron::tui::services::Services;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging
    let _log_guard = logging::init_tui(&config.log_dir());
    log::info!("Spectron v{} starting", spectron::VERSION);
    match config_error {
        Some(e) => log::warn!(
            "Failed to load config from {}: {e}; using defaults",
            AppConfig::config_path().display()
        ),
        None => log::info!("Loaded config (file: {})", AppConfig::config_path().display()),
    }

    let (client_tx, client_rx) = events::channel();
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    let services = match Services::init(&config, client_tx, event_tx) {
        Ok(services) => services,
        Err(e) => {
            log::error!("Failed to initialize backend gateway: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let mut app = AppState::new(event_rx, client_rx, services);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableFocusChange
    )?;
    if config.tui.mouse_enabled {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let tick_rate = Duration::from_millis(config.tui.tick_rate_ms.max(1));
    let result = app.run(&mut terminal, tick_rate).await;

    // Restore terminal
    disable_raw_mode()?;
    if config.tui.mouse_enabled {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        log::error!("TUI exited with error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    log::info!("Spectron exiting");
    Ok(())
}
