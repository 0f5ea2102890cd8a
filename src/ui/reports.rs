//! Reports, content moderation and verification screens.
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Wrap};

use crate::app::{AppState, ModalState, Theme};
use crate::records::{ContentRecord, NOT_AVAILABLE, ReportRecord, VerificationRequest, VerificationStatus, format_date};
use crate::ui::components::centered_rect;
use crate::ui::{Columns, render_list};

fn report_row(r: &ReportRecord, _theme: &Theme) -> Row<'static> {
    Row::new(vec![
        Cell::from(r.id.clone()),
        Cell::from(r.reporter().to_string()),
        Cell::from(r.reason_label().to_string()),
        Cell::from(r.date()),
    ])
}

fn content_row(c: &ContentRecord, theme: &Theme) -> Row<'static> {
    let media = if c.has_external_media() {
        Cell::from(c.media_label()).style(Style::default().fg(theme.accent))
    } else {
        Cell::from(c.media_label())
    };
    Row::new(vec![
        Cell::from(c.full_name()),
        Cell::from(c.email.clone()),
        media,
        Cell::from(c.colors_label()),
        Cell::from(c.joined()),
    ])
}

fn verification_row(v: &VerificationRequest, theme: &Theme) -> Row<'static> {
    let color = match v.status {
        VerificationStatus::Pending => theme.highlight_fg,
        VerificationStatus::Approved => theme.success,
    };
    Row::new(vec![
        Cell::from(v.name.clone()),
        Cell::from(v.email.clone()),
        Cell::from(v.status.label()).style(Style::default().fg(color)),
        Cell::from(format_date(v.requested_at)),
    ])
}

pub fn render_reports(f: &mut Frame, area: Rect, app: &AppState) {
    render_list(
        f,
        area,
        app,
        "User Reports",
        &app.reports,
        Columns {
            header: vec!["Report", "Reporter", "Reason", "Date"],
            widths: vec![
                Constraint::Length(26),
                Constraint::Percentage(28),
                Constraint::Percentage(40),
                Constraint::Min(14),
            ],
            row: report_row,
        },
    );
}

pub fn render_moderation(f: &mut Frame, area: Rect, app: &AppState) {
    render_list(
        f,
        area,
        app,
        "Content Moderation",
        &app.moderation,
        Columns {
            header: vec!["Name", "Email", "Media", "Favorite colors", "Joined"],
            widths: vec![
                Constraint::Percentage(20),
                Constraint::Percentage(28),
                Constraint::Length(15),
                Constraint::Percentage(22),
                Constraint::Min(14),
            ],
            row: content_row,
        },
    );
}

pub fn render_verification(f: &mut Frame, area: Rect, app: &AppState) {
    render_list(
        f,
        area,
        app,
        "Verification Requests",
        &app.verification,
        Columns {
            header: vec!["Name", "Email", "Status", "Requested"],
            widths: vec![
                Constraint::Percentage(28),
                Constraint::Percentage(36),
                Constraint::Length(10),
                Constraint::Min(14),
            ],
            row: verification_row,
        },
    );
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Full record of a moderated user.
pub fn render_content_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    let ModalState::ContentDetail { id } = state else { return };
    let Some(c) = app.moderation.find(id) else { return };
    let theme = &app.theme;

    let width = 70u16.min(area.width.saturating_sub(4)).max(40);
    let height = 20u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<18}"), Style::default().fg(theme.muted)),
            Span::raw(value),
        ])
    };
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let lines = vec![
        Line::from(Span::styled(
            c.full_name(),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        row("Email", c.email.clone()),
        row("Role", c.role.clone()),
        row("Photo", c.photo_url()),
        row("Favorite colors", c.colors_label()),
        row(
            "Distance",
            c.distance_km.map(|d| format!("{d} km")).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        row("Phone", opt(&c.phone)),
        row("Referral code", opt(&c.referral_code)),
        row("Email verified", yes_no(c.email_verified).to_string()),
        row("Phone verified", yes_no(c.phone_verified).to_string()),
        row("Face verified", yes_no(c.facial_verified).to_string()),
        row("Joined", c.joined()),
        Line::raw(""),
        Line::styled("Esc / Enter to close", Style::default().fg(theme.muted)),
    ];
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("User Content")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
