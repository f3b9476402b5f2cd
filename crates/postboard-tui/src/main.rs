//! Postboard TUI - A terminal client for the Postboard community board.
//!
//! This application provides a fast, keyboard-driven interface for reading
//! the post feed, liking and commenting, and writing posts.

mod app;
mod cli;
mod events;
mod ui;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use postboard_core::{ApiClient, Config, TokenStore};

use app::{App, AppState};
use cli::Command;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log filter used when RUST_LOG is not set
const DEFAULT_LOG_FILTER: &str = "warn";

const LOG_FILE_NAME: &str = "postboard.log";

/// Where log output goes
enum LogTarget {
    /// Stderr, for subcommands
    Stderr,
    /// A file in the data directory, while the TUI owns the terminal
    File,
}

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes buffered lines when dropped, so it must be
/// kept alive until exit.
fn init_tracing(config: &Config, target: LogTarget) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (writer, guard, ansi) = match target {
        LogTarget::Stderr => {
            let (writer, guard) = tracing_appender::non_blocking(io::stderr());
            (writer, guard, true)
        }
        LogTarget::File => {
            let appender = config.data_dir().ok().and_then(|dir| {
                RollingFileAppender::builder()
                    .rotation(Rotation::NEVER)
                    .filename_prefix(LOG_FILE_NAME)
                    .build(dir)
                    .ok()
            });
            let (writer, guard) = match appender {
                Some(appender) => tracing_appender::non_blocking(appender),
                // Nowhere to write; stderr would corrupt the screen
                None => tracing_appender::non_blocking(io::sink()),
            };
            (writer, guard, false)
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(ansi))
        .with(filter)
        .init();

    guard
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load config ({}), using defaults", e);
        Config::default()
    })
}

fn build_client(config: &Config) -> Result<ApiClient> {
    let tokens = TokenStore::from_config(config)?;
    Ok(ApiClient::from_config(config, tokens)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    match command {
        Command::Help => {
            println!("{}", cli::USAGE);
            Ok(())
        }
        Command::Version => {
            println!("postboard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Login { email } => {
            let config = load_config();
            let _guard = init_tracing(&config, LogTarget::Stderr);
            login_command(config, email).await
        }
        Command::Logout => {
            let config = load_config();
            let _guard = init_tracing(&config, LogTarget::Stderr);
            logout_command(&config).await
        }
        Command::Status => {
            let config = load_config();
            let _guard = init_tracing(&config, LogTarget::Stderr);
            status_command(&config).await
        }
        Command::Run => {
            let config = load_config();
            let _guard = init_tracing(&config, LogTarget::File);
            run_tui().await
        }
    }
}

/// Prompt for credentials and store the session
async fn login_command(mut config: Config, email: Option<String>) -> Result<()> {
    let api = build_client(&config)?;

    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => {
            print!("Email: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", email))?;

    api.login(&email, &password)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    config.last_email = Some(email.clone());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {}", email);
    Ok(())
}

async fn logout_command(config: &Config) -> Result<()> {
    let api = build_client(config)?;
    if !api.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    api.logout().await.map_err(|e| anyhow!(e.user_message()))?;
    println!("Logged out");
    Ok(())
}

async fn status_command(config: &Config) -> Result<()> {
    let api = build_client(config)?;
    println!("Server: {}", config.api_base_url);
    if !api.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    match api.me().await {
        Ok(member) => println!(
            "Logged in as {}",
            member
                .nickname
                .or(member.email)
                .unwrap_or_else(|| member.member_id.to_string())
        ),
        Err(e) => println!("Session stored, but the server said: {}", e.user_message()),
    }
    Ok(())
}

async fn run_tui() -> Result<()> {
    info!("Postboard TUI starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Show the feed, or the login form when no session is stored
    app.start();

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
        eprintln!("Error: {}", e);
    }

    info!("Postboard TUI shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Apply results from background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
