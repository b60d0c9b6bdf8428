use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::AppState;
use crate::app::keymap::{ALL_ACTIONS, KeyAction, describe_action};
use crate::notify::ToastKind;

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Bottom line: busy indicators, counts, selection.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mut parts: Vec<String> = Vec::new();
    if app.store.is_loading() {
        parts.push("loading users...".to_string());
    }
    if app.store.is_submitting() {
        parts.push("adding user...".to_string());
    }
    let visible = app.visible_users().len();
    if visible > 0 {
        parts.push(format!("{}/{}", app.selected_index + 1, visible));
    }
    parts.push(format!("total: {}", app.store.users().len()));

    let p = Paragraph::new(format!(" {}", parts.join("  |  ")))
        .style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Toast in the top-right corner, if one is visible.
pub fn render_toast(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(toast) = app.notifier.current() else {
        return;
    };
    let (title, color) = match toast.kind {
        ToastKind::Success => ("Success", app.theme.success),
        ToastKind::Error => ("Error", app.theme.error),
    };
    let width = 46u16.min(area.width);
    let inner = width.saturating_sub(2).max(1) as usize;
    let lines = (toast.message.chars().count() / inner + 1) as u16;
    let height = (lines + 2).min(area.height);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height,
    }
    .intersection(area);
    let p = Paragraph::new(toast.message)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Help modal built from the active keymap.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let height = 20u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("User list", Style::default().add_modifier(Modifier::BOLD))),
    ];
    for action in ALL_ACTIONS {
        if action == KeyAction::Ignore {
            continue;
        }
        let keys = app.keymap.keys_for(action);
        if keys.is_empty() {
            continue;
        }
        lines.push(Line::from(vec![
            Span::raw(format!("{:<24}", describe_action(action))),
            Span::styled(keys.join(", "), Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Search / form", Style::default().add_modifier(Modifier::BOLD))));
    for (label, value) in [
        ("Apply search", "Enter"),
        ("Cancel search", "Esc"),
        ("Next form field", "Tab"),
        ("Submit form", "Enter"),
        ("Leave form", "Esc"),
        ("Close dialog", "Esc, Enter"),
    ] {
        lines.push(Line::from(vec![
            Span::raw(format!("{label:<24}")),
            Span::styled(value, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect { x: 0, y: 0, width: 20, height: 10 };
        assert_eq!(centered_rect(10, 4, area), Rect { x: 5, y: 3, width: 10, height: 4 });
        assert_eq!(centered_rect(40, 40, area), Rect { x: 0, y: 0, width: 20, height: 10 });
    }
}
