mod app;
mod auth;
mod config;
mod db;
mod logging;
mod models;
mod navigation;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::app::{App, AppEvent};
use crate::auth::{AuthProvider, PgAuth, SessionStore};
use crate::db::ProjectStore;

const TICK: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init(config::Cli::parse())?;
    logging::init(&config)?;
    println!("Initializing sitebook...");

    // Initialize database connection
    let db = db::init(&config).await?;
    println!("Database connection established");
    let auth = PgAuth::new(db.clone(), SessionStore::new(&config.session_file));

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut app = App::new(db, auth, events_tx);
    app.start();

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app, events_rx).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        tracing::error!(error = %err, "terminal loop failed");
        println!("Error: {}", err);
    }

    println!("Thanks for using sitebook!");

    Ok(())
}

async fn run_app<B, S, A>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, A>,
    mut events: UnboundedReceiver<AppEvent>,
) -> Result<()>
where
    B: Backend,
    S: ProjectStore,
    A: AuthProvider,
{
    loop {
        terminal.draw(|f| app.render(f))?;

        while let Ok(event) = events.try_recv() {
            app.apply(event);
        }

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }

        app.expire_notice(Instant::now());
        tokio::task::yield_now().await;
    }

    Ok(())
}
