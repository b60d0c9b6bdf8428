use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode};
use crate::form::Field;

/// The "Add user" panel.
pub fn render_form(f: &mut Frame, area: Rect, app: &AppState) {
    let editing = app.input_mode == InputMode::Form;
    let mut lines: Vec<Line> = Vec::new();

    for field in [Field::Name, Field::Email] {
        let focused = editing && app.form.focus == field;
        let marker = if focused { "▶ " } else { "  " };
        let label_style = if focused {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(Span::styled(format!("{marker}{}", field.label()), label_style)));

        let value = app.form.value(field);
        let shown = if value.is_empty() && !focused {
            Span::styled(
                match field {
                    Field::Name => "  Enter user name",
                    Field::Email => "  Enter email",
                },
                Style::default().fg(app.theme.muted),
            )
        } else {
            let cursor = if focused { "_" } else { "" };
            Span::styled(format!("  {value}{cursor}"), Style::default().fg(app.theme.text))
        };
        lines.push(Line::from(shown));

        if field == Field::Email && !value.trim().is_empty() && !app.form.email_looks_valid() {
            lines.push(Line::from(Span::styled(
                "  doesn't look like an email address",
                Style::default().fg(app.theme.muted).add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::raw(""));
    }

    let button = if app.store.is_submitting() {
        Span::styled("[ Adding user... ]", Style::default().fg(app.theme.muted))
    } else if editing {
        Span::styled(
            "[ Add User ]  Enter",
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("[ Add User ]  press n", Style::default().fg(app.theme.muted))
    };
    lines.push(Line::from(button));
    if editing {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Tab: next field; Esc: back to list",
            Style::default().fg(app.theme.muted),
        )));
    }

    let border = if editing { app.theme.title } else { app.theme.border };
    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Add User")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}
