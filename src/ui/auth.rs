//! Sign-in form and the one-time-code popup.
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::AppState;
use crate::auth::{AuthMode, AuthStage};
use crate::ui::components::centered_rect;

pub fn render_login(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let flow = &app.auth;
    let rect = centered_rect(56u16.min(area.width), 12u16.min(area.height), area);

    let button = if flow.is_busy() {
        "Sending…"
    } else {
        match flow.mode {
            AuthMode::Login => "Enter: Log in",
            AuthMode::Register => "Enter: Register",
        }
    };
    let switch = match flow.mode {
        AuthMode::Login => "Tab: need an account? Register",
        AuthMode::Register => "Tab: have an account? Log in",
    };
    let mut lines = vec![
        Line::from(Span::styled(
            flow.mode.title(),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Email  ", Style::default().fg(theme.muted)),
            Span::styled(flow.email.clone(), Style::default().fg(theme.text)),
            Span::styled("▏", Style::default().fg(theme.accent)),
        ]),
        Line::raw(""),
        Line::styled(button, Style::default().fg(theme.accent)),
        Line::styled(switch, Style::default().fg(theme.muted)),
    ];
    if let Some(msg) = flow.message() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(msg.to_string(), Style::default().fg(theme.danger)));
    }
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("Blumdate admin")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);

    if flow.stage() == AuthStage::AwaitingCode {
        render_code_popup(f, area, app);
    }
}

fn render_code_popup(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let flow = &app.auth;
    let rect = centered_rect(44u16.min(area.width), 10u16.min(area.height), area);

    let mut slots: Vec<Span> = Vec::new();
    for (i, slot) in flow.otp.slots().into_iter().enumerate() {
        if i > 0 {
            slots.push(Span::raw(" "));
        }
        slots.push(match slot {
            Some(c) => Span::styled(format!("[{c}]"), Style::default().fg(theme.highlight_fg)),
            None => Span::styled("[ ]", Style::default().fg(theme.muted)),
        });
    }
    let mut lines = vec![
        Line::raw(format!("Code sent to {}", flow.email.trim())),
        Line::raw(""),
        Line::from(slots),
        Line::raw(""),
        Line::styled(
            if flow.is_busy() { "Verifying…" } else { "Enter: verify  r: resend  Esc: cancel" },
            Style::default().fg(theme.accent),
        ),
    ];
    if let Some(msg) = flow.message() {
        lines.push(Line::styled(msg.to_string(), Style::default().fg(theme.muted)));
    }
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("Enter verification code")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
