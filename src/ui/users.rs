use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::app::{AppState, InputMode};
use crate::model::UserRecord;
use crate::ui::components::centered_rect;

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let users = app.visible_users();
    let title = if app.store.is_loading() {
        "Users (loading...)".to_string()
    } else if app.search_query.is_empty() {
        format!("Users ({})", users.len())
    } else {
        format!("Users ({} of {})", users.len(), app.store.users().len())
    };
    let border = if app.input_mode == InputMode::Normal || app.input_mode == InputMode::Search {
        app.theme.title
    } else {
        app.theme.border
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    if users.is_empty() {
        let msg = if app.store.is_loading() {
            "Loading users..."
        } else if app.search_query.is_empty() {
            "No users yet."
        } else {
            "No users match the search."
        };
        let p = Paragraph::new(msg).style(Style::default().fg(app.theme.muted)).block(block);
        f.render_widget(p, area);
        return;
    }

    let start = (app.selected_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(users.len());
    let slice = users.get(start..end).unwrap_or_default();

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let absolute_index = start + i;
        let style = if absolute_index == app.selected_index {
            Style::default().fg(app.theme.highlight_fg).bg(app.theme.highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from((absolute_index + 1).to_string()),
            Cell::from(u.display_name().to_string()),
            Cell::from(u.display_email().to_string()),
        ])
        .style(style)
    });

    let widths = [Constraint::Length(5), Constraint::Percentage(40), Constraint::Percentage(60)];
    let header = Row::new(vec!["#", "NAME", "EMAIL"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths).header(header).block(block).column_spacing(1);
    f.render_widget(table, area);
}

/// Modal with everything known about one user.
pub fn render_detail_modal(f: &mut Frame, area: Rect, app: &AppState, user: &UserRecord) {
    let width = 60u16.min(area.width.saturating_sub(4)).max(30);
    let rect = centered_rect(width, 8, area);
    let text = format!(
        "Name:  {}\nEmail: {}\nID:    {}\n\nEsc / Enter: close",
        user.display_name(),
        user.display_email(),
        user.id.as_deref().unwrap_or("-"),
    );
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title("User detail")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
