//! userdesk binary entry point.
//!
//! Parses the command line, sets up logging and the tokio runtime, then
//! either runs the TUI (raw mode, restored on exit) or one headless command.

use std::io::Write as _;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use userdesk::api::HttpUserApi;
use userdesk::app::keymap::Keymap;
use userdesk::app::{self, AppState, Theme};
use userdesk::config::{Cli, Command};
use userdesk::form::{Field, FormState};
use userdesk::model::UserRecord;
use userdesk::notify::{Notifier, ToastKind};
use userdesk::search;
use userdesk::store::UserStore;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("USERDESK_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The TUI owns the terminal, so its logs go to a file.
fn init_file_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn run_console(cli: &Cli, api: HttpUserApi) -> Result<()> {
    init_file_logging(&cli.log_file)?;
    let mut app = AppState::new(Arc::new(api), cli.base_url(), cli.mode)
        .with_theme(Theme::load_or_init(&cli.theme))
        .with_keymap(Keymap::load_or_init(&cli.keybinds));

    let mut terminal = init_terminal().context("init terminal")?;
    let res = app::run(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();
    res
}

fn print_users(users: &[UserRecord]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for (i, u) in users.iter().enumerate() {
        writeln!(out, "{:>4}  {:<28}  {}", i + 1, u.display_name(), u.display_email())?;
    }
    Ok(())
}

/// Report the toast a headless command produced on stderr.
fn report(notifier: &Notifier) {
    if let Some(toast) = notifier.current() {
        let prefix = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
        };
        eprintln!("{prefix}: {}", toast.message);
    }
}

async fn run_headless(command: Command, api: HttpUserApi) -> Result<()> {
    init_stderr_logging();
    let mut store = UserStore::new();
    let mut notifier = Notifier::new();
    match command {
        Command::List { query } => {
            let res = store.fetch_all(&api, &mut notifier).await;
            report(&notifier);
            res?;
            let q = query.unwrap_or_default();
            print_users(&search::apply(store.users(), &q))?;
        }
        Command::Add { name, email } => {
            let mut form = FormState::new();
            form.update(Field::Name, name);
            form.update(Field::Email, email);
            let res = store.create(&api, &mut form, &mut notifier).await;
            report(&notifier);
            res?;
            print_users(store.users())?;
        }
    }
    Ok(())
}

/// Program entry point: run the TUI or a headless command.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let _guard = runtime.enter();

    let api = HttpUserApi::new(cli.base_url(), cli.timeout())?;
    match cli.command.clone() {
        Some(command) => runtime.block_on(run_headless(command, api)),
        None => run_console(&cli, api),
    }
}
