pub mod components;
pub mod form;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode, ModalState};
use crate::config::DeployMode;

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(root[1]);

    let mode = match app.mode {
        DeployMode::Development => "dev",
        DeployMode::Production => "prod",
    };
    let prompt = match app.input_mode {
        InputMode::Search => format!("  Search: {}_", app.search_query),
        _ if !app.search_query.is_empty() => format!("  Filter: {}", app.search_query),
        _ => String::new(),
    };
    let p = Paragraph::new(format!(
        "{} [{mode}]{prompt}  /: search; n: add user; r: reload; Enter: detail; ?: help; q: quit",
        app.base_url
    ))
    .block(
        Block::default()
            .title("userdesk")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    users::render_users_table(f, body[0], app);
    form::render_form(f, body[1], app);
    components::render_status_bar(f, root[2], app);

    let area = f.area();
    if let Some(modal) = app.modal.clone() {
        match modal {
            ModalState::Detail(user) => users::render_detail_modal(f, area, app, &user),
            ModalState::Help { scroll } => components::render_help_modal(f, area, app, scroll),
        }
    }

    components::render_toast(f, area, app);
}
