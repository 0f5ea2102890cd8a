//! Shared UI components: status bar, centered modals and the help reference.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, describe_action};
use crate::app::{AppState, InputMode, ModalState, Screen};
use crate::records::BlockAction;

/// Render the bottom status bar: mode, last feedback message and key hints.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::PageJump => "PAGE",
        InputMode::Login => "LOGIN",
        InputMode::Modal => "MODAL",
    };
    let hint = match (app.input_mode, app.screen) {
        (InputMode::Search, _) => "type to filter  Enter: done  Esc: clear",
        (InputMode::PageJump, _) => "digits  Enter: go  Esc: cancel",
        (InputMode::Login, _) => "Enter: submit  Tab: login/register  Ctrl+c: quit",
        (_, Screen::Profiles) => "Enter: open  d: delete  s: suspend  /: search  ?: help",
        (_, Screen::Suspended) => "Enter: open  s: unblock  /: search  ?: help",
        (_, Screen::ProfileDetail) => "s: suspend/unblock  d: delete  Esc: back",
        (_, Screen::Moderation) => "Enter: details  /: search  ?: help",
        _ => "Tab: next screen  r: reload  ?: help  q: quit",
    };
    let mut spans = vec![Span::styled(format!(" {mode} "), Style::default().add_modifier(Modifier::BOLD))];
    if let Some(status) = &app.status {
        spans.push(Span::raw(format!(" {status} ")));
        spans.push(Span::raw("│"));
    }
    spans.push(Span::raw(format!(" {hint}")));
    let p = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

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

/// Delete / suspend confirmation with Confirm and Cancel buttons.
pub fn render_confirm_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    let (title, question, confirm, selected) = match state {
        ModalState::DeleteConfirm { target, selected } => (
            "Delete user",
            format!("Delete {}? This cannot be undone.", target.name),
            "Delete",
            *selected,
        ),
        ModalState::SuspendConfirm { target, action, selected } => {
            let question = match action {
                BlockAction::Block => format!("Suspend {}? They will not be able to sign in.", target.name),
                BlockAction::Unblock => format!("Unblock {}?", target.name),
            };
            (action.verb(), question, action.verb(), *selected)
        }
        _ => return,
    };
    let rect = centered_rect(56u16.min(area.width.saturating_sub(4)).max(36), 8, area);
    let button = |label: &str, focused: bool| {
        let marker = if focused { "▶" } else { " " };
        let style = if focused {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Span::styled(format!("{marker} {label}  "), style)
    };
    let lines = vec![
        Line::raw(question),
        Line::raw(""),
        Line::from(vec![button(confirm, selected == 0), button("Cancel", selected != 0)]),
    ];
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.danger)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Blocking alert that must be dismissed.
pub fn render_alert_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    let ModalState::Alert { title, message } = state else {
        return;
    };
    let border = app.theme.danger;
    let max_w = area.width.saturating_sub(6).max(30);
    let width = 48u16.min(max_w);
    let approx_lines = (message.len() as u16 / width.saturating_sub(4).max(10)).max(1);
    let max_h = area.height.saturating_sub(6).max(5);
    let height = (approx_lines + 4).min(max_h).max(5);
    let rect = centered_rect(width, height, area);
    let p = Paragraph::new(vec![
        Line::raw(message.clone()),
        Line::raw(""),
        Line::styled("Enter / Esc to close", Style::default().fg(app.theme.muted)),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .title(title.as_str())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Help modal listing the current keybindings.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(48);
    let height = 24u16.min(area.height.saturating_sub(4)).max(12);
    let rect = centered_rect(width, height, area);

    let sections: [(&str, &[KeyAction]); 3] = [
        (
            "General",
            &[KeyAction::Quit, KeyAction::OpenHelp, KeyAction::Reload, KeyAction::NextScreen, KeyAction::PrevScreen],
        ),
        (
            "Lists",
            &[
                KeyAction::StartSearch,
                KeyAction::MoveUp,
                KeyAction::MoveDown,
                KeyAction::PrevPage,
                KeyAction::NextPage,
                KeyAction::FirstPage,
                KeyAction::LastPage,
                KeyAction::JumpToPage,
            ],
        ),
        (
            "Actions",
            &[KeyAction::OpenSelection, KeyAction::DeleteSelection, KeyAction::ToggleSuspend, KeyAction::Back],
        ),
    ];

    let mut lines: Vec<Line> = Vec::new();
    for (heading, actions) in sections {
        lines.push(Line::from(Span::styled(
            format!("{heading}:"),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for action in actions {
            let keys = app.keymap.keys_for(*action).join(", ");
            lines.push(Line::from(vec![
                Span::raw(format!("  {:<40}", describe_action(*action))),
                Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
            ]));
        }
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(vec![
        Span::raw("Search runs after you stop typing; "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::ITALIC)),
        Span::raw(" applies it at once."),
    ]));
    lines.push(Line::from(vec![
        Span::raw("Close help: "),
        Span::styled("Esc / Enter", Style::default().add_modifier(Modifier::ITALIC)),
    ]));

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
