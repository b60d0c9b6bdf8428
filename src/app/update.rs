use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, info};

use crate::app::keymap::KeyAction;
use crate::app::{AppEvent, AppState, InputMode, ModalState};
use crate::store::OpKind;
use crate::ui;

/// Run the interactive loop until the user quits.
///
/// Must be called from inside a tokio runtime context: requests are spawned
/// onto it and report back through the app's event channel.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    info!(base_url = %app.base_url, mode = ?app.mode, "console started");
    start_fetch(app);

    let res = event_loop(terminal, app);
    teardown(app);
    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        terminal
            .draw(|f| ui::render(f, app))
            .context("draw frame")?;

        if event::poll(Duration::from_millis(100)).context("poll terminal events")? {
            match event::read().context("read terminal event")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                // clicking anywhere dismisses an open dialog
                Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) && app.modal.is_some() => {
                    close_modal(app)
                }
                _ => {}
            }
        }
        drain_events(app);

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Abort everything still pending so nothing mutates state after exit.
pub fn teardown(app: &mut AppState) {
    app.store.cancel_all();
    app.notifier.hide();
    debug!("console torn down");
}

/// Apply every completion that has already arrived.
pub fn drain_events(app: &mut AppState) -> usize {
    let mut n = 0;
    while let Some(ev) = app.try_next_event() {
        apply_event(app, ev);
        n += 1;
    }
    n
}

pub fn apply_event(app: &mut AppState, ev: AppEvent) {
    match ev {
        AppEvent::UsersLoaded { seq, result } => {
            if seq != app.fetch_seq {
                debug!(seq, current = app.fetch_seq, "dropping stale user list");
                return;
            }
            let _ = app.store.finish_fetch(result, &mut app.notifier);
            app.clamp_selection();
            refresh_detail(app);
        }
        AppEvent::UserCreated(result) => {
            if app.store.finish_create(result, &mut app.form, &mut app.notifier).is_ok() {
                start_refetch(app);
            }
        }
    }
}

/// Start loading the user list unless a load is already running.
pub fn start_fetch(app: &mut AppState) {
    if let Err(err) = app.store.begin(OpKind::Fetch) {
        debug!(%err, "refresh ignored");
        return;
    }
    spawn_fetch(app);
}

fn start_refetch(app: &mut AppState) {
    app.store.begin_refetch();
    spawn_fetch(app);
}

fn spawn_fetch(app: &mut AppState) {
    app.fetch_seq += 1;
    let seq = app.fetch_seq;
    let api = Arc::clone(&app.api);
    let tx = app.events_tx();
    let task = tokio::spawn(async move {
        let result = api.get_users().await;
        let _ = tx.send(AppEvent::UsersLoaded { seq, result });
    });
    app.store.attach(OpKind::Fetch, task.abort_handle());
}

/// Validate the draft and start the create request.
pub fn submit_form(app: &mut AppState) {
    if app.store.is_submitting() {
        return;
    }
    let Ok(body) = app.store.begin_create(&app.form, &mut app.notifier) else {
        return;
    };
    let api = Arc::clone(&app.api);
    let tx = app.events_tx();
    let task = tokio::spawn(async move {
        let result = api.add_user(&body).await;
        let _ = tx.send(AppEvent::UserCreated(result));
    });
    app.store.attach(OpKind::Create, task.abort_handle());
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::Search => handle_search_key(app, key.code),
        InputMode::Form => handle_form_key(app, key.code),
        InputMode::Modal => handle_modal_key(app, key.code),
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) {
    let Some(action) = app.keymap.resolve(&key) else {
        return;
    };
    let len = app.visible_users().len();
    match action {
        KeyAction::Quit => app.should_quit = true,
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::ClearSearch => {
            app.search_query.clear();
            app.selected_index = 0;
        }
        KeyAction::FocusForm => app.input_mode = InputMode::Form,
        KeyAction::Refresh => start_fetch(app),
        KeyAction::OpenDetail => {
            if let Some(user) = app.selected_user() {
                open_modal(app, ModalState::Detail(user));
            }
        }
        KeyAction::OpenHelp => open_modal(app, ModalState::Help { scroll: 0 }),
        KeyAction::MoveUp => app.selected_index = app.selected_index.saturating_sub(1),
        KeyAction::MoveDown => {
            if app.selected_index + 1 < len {
                app.selected_index += 1;
            }
        }
        KeyAction::PageUp => app.selected_index = app.selected_index.saturating_sub(app.rows_per_page),
        KeyAction::PageDown => {
            app.selected_index = (app.selected_index + app.rows_per_page).min(len.saturating_sub(1));
        }
        KeyAction::Ignore => {}
    }
}

fn handle_search_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.selected_index = 0;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.search_query.pop();
            app.selected_index = 0;
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.selected_index = 0;
        }
        _ => {}
    }
}

fn handle_form_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => app.form.focus_next(),
        KeyCode::Enter => submit_form(app),
        // the draft is reset when the create lands
        _ if app.store.is_submitting() => {}
        KeyCode::Backspace => app.form.pop_char(),
        KeyCode::Char(c) => app.form.push_char(c),
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    if let Some(ModalState::Help { scroll }) = &mut app.modal {
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                *scroll = scroll.saturating_add(1);
                return;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                *scroll = scroll.saturating_sub(1);
                return;
            }
            _ => {}
        }
    }
    if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Backspace) {
        close_modal(app);
    }
}

fn open_modal(app: &mut AppState, modal: ModalState) {
    app.modal = Some(modal);
    app.input_mode = InputMode::Modal;
}

pub fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}

/// A list reload replaces every record; drop a detail whose user is gone.
fn refresh_detail(app: &mut AppState) {
    if let Some(ModalState::Detail(user)) = &app.modal
        && !app.store.users().contains(user)
    {
        close_modal(app);
    }
}
