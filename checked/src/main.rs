//! `Checked` — terminal to-do list with real-time sync.
//!
//! Launches the TUI and optionally connects to a `checked-sync` server
//! for live task syncing. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/checked/config.toml`).
//!
//! ```bash
//! # Offline mode with an in-process store
//! cargo run --bin checked
//!
//! # Sync against a server
//! cargo run --bin checked -- --store-url ws://127.0.0.1:9100/ws --user alice
//!
//! # Or via environment variables
//! CHECKED_STORE_URL=ws://127.0.0.1:9100/ws CHECKED_USER=alice cargo run
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;

use checked::app::{App, Connection};
use checked::board::StoreOp;
use checked::config::{CliArgs, ClientConfig};
use checked::store::{LocalStore, RemoteStore, TaskStore};
use checked::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("checked starting");

    // Connect to the store before taking the terminal over, so connect
    // errors are still printable.
    let store_config = config.to_store_config();
    let user = config.user.clone().unwrap_or_else(|| "you".to_string());
    let (store, connection): (Store, Connection) = match store_config {
        Some(ref sc) => match RemoteStore::connect(&sc.url, &sc.user).await {
            Ok(remote) => (Store::Remote(Arc::new(remote)), Connection::Online),
            Err(e) => {
                tracing::warn!(error = %e, "could not reach sync server, running offline");
                (Store::Local(Arc::new(offline_store(&user))), Connection::Offline)
            }
        },
        None => (Store::Local(Arc::new(offline_store(&user))), Connection::Offline),
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = match store {
        Store::Remote(remote) => run_app(&mut terminal, remote, user, connection, &config).await,
        Store::Local(local) => run_app(&mut terminal, local, user, connection, &config).await,
    };

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("checked exiting");
    result
}

/// The two store backends the binary can run against.
enum Store {
    Remote(Arc<RemoteStore>),
    Local(Arc<LocalStore>),
}

/// In-process store pre-filled with a few starter tasks.
fn offline_store(user: &str) -> LocalStore {
    let store = LocalStore::new(user);
    store.seed_task("Try adding a task with 'a'", false, None);
    store.seed_task("Toggle a task with Space", false, None);
    store.seed_task("Read the key hints below", true, None);
    store
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("checked.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app<S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: Arc<S>,
    user: String,
    connection: Connection,
    config: &ClientConfig,
) -> io::Result<()>
where
    S: TaskStore + 'static,
{
    let mut app = App::new(user, connection);
    let mut subscription = store.subscribe();

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Apply every pending snapshot in order (non-blocking).
        while let Some(tasks) = subscription.try_next() {
            app.board.apply_snapshot(tasks);
        }

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key_event(key);
        }

        // Step 4: Submit queued mutations in the background. Failures
        // are logged, never surfaced; the board only changes when a
        // fresh snapshot arrives.
        for op in app.take_ops() {
            submit_op(Arc::clone(&store), op);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Fire-and-forget submission of one store mutation.
fn submit_op<S>(store: Arc<S>, op: StoreOp)
where
    S: TaskStore + 'static,
{
    tokio::spawn(async move {
        let result = match &op {
            StoreOp::Create { name } => store.create_task(name).await,
            StoreOp::Update(patch) => store.update_task(patch.clone()).await,
            StoreOp::Delete(id) => store.delete_task(id).await,
        };
        if let Err(e) = result {
            tracing::warn!(op = ?op, error = %e, "store operation failed");
        }
    });
}
