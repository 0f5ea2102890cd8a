use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Wrap};

use crate::app::{AppState, Theme};
use crate::controller::LoadState;
use crate::records::{AccountStatus, AccountType, UserRecord};
use crate::ui::{Columns, render_list, render_notice};

fn status_cell(status: AccountStatus, theme: &Theme) -> Cell<'static> {
    let color = match status {
        AccountStatus::Active => theme.success,
        AccountStatus::Suspended => theme.danger,
    };
    Cell::from(status.label()).style(Style::default().fg(color))
}

fn profile_row(u: &UserRecord, theme: &Theme) -> Row<'static> {
    let plan = match u.account_type {
        AccountType::Premium => Cell::from("Premium").style(Style::default().fg(theme.accent)),
        AccountType::Free => Cell::from("Free"),
    };
    Row::new(vec![
        Cell::from(u.name.clone()),
        Cell::from(u.email.clone()),
        plan,
        status_cell(u.status, theme),
        Cell::from(u.join_date()),
    ])
}

fn suspended_row(u: &UserRecord, theme: &Theme) -> Row<'static> {
    Row::new(vec![
        Cell::from(u.name.clone()),
        Cell::from(u.email.clone()),
        status_cell(u.status, theme),
        Cell::from(u.last_login()),
    ])
}

pub fn render_profiles(f: &mut Frame, area: Rect, app: &AppState) {
    render_list(
        f,
        area,
        app,
        "User Profiles",
        &app.profiles,
        Columns {
            header: vec!["Name", "Email", "Account", "Status", "Joined"],
            widths: vec![
                Constraint::Percentage(24),
                Constraint::Percentage(32),
                Constraint::Length(9),
                Constraint::Length(10),
                Constraint::Min(14),
            ],
            row: profile_row,
        },
    );
}

pub fn render_suspended(f: &mut Frame, area: Rect, app: &AppState) {
    render_list(
        f,
        area,
        app,
        "Suspended Users",
        &app.suspended,
        Columns {
            header: vec!["Name", "Email", "Status", "Last login"],
            widths: vec![
                Constraint::Percentage(26),
                Constraint::Percentage(34),
                Constraint::Length(10),
                Constraint::Min(20),
            ],
            row: suspended_row,
        },
    );
}

fn field<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), Style::default().fg(theme.muted)),
        Span::styled(value, Style::default().fg(theme.text)),
    ])
}

/// Card for a single account plus its subscription block.
pub fn render_profile_detail(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let Some(detail) = app.detail.as_ref() else {
        render_notice(f, area, theme, "User Profile", "No user selected.", Style::default().fg(theme.muted));
        return;
    };
    let user = match (&detail.state, &detail.record) {
        (LoadState::Loading, _) => {
            render_notice(f, area, theme, "User Profile", "Loading…", Style::default().fg(theme.muted));
            return;
        }
        (LoadState::Failed(err), _) => {
            let msg = err.user_message();
            render_notice(f, area, theme, "User Profile", &msg, Style::default().fg(theme.danger));
            return;
        }
        (LoadState::Ready, None) => {
            let msg = "User not found or failed to load.";
            render_notice(f, area, theme, "User Profile", msg, Style::default().fg(theme.danger));
            return;
        }
        (LoadState::Ready, Some(user)) => user,
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let busy = app.profiles.is_in_flight(&user.id) || app.suspended.is_in_flight(&user.id);
    let status_color = match user.status {
        AccountStatus::Active => theme.success,
        AccountStatus::Suspended => theme.danger,
    };
    let mut lines = vec![
        Line::from(Span::styled(
            user.name.clone(),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::styled(format!("@{}", user.username()), Style::default().fg(theme.muted)),
        Line::raw(""),
        field("Email", user.email.clone(), theme),
        Line::from(vec![
            Span::styled(format!("{:<16}", "Status"), Style::default().fg(theme.muted)),
            Span::styled(user.status.label(), Style::default().fg(status_color)),
        ]),
        field("Account", user.account_type.label().to_string(), theme),
        field("Joined", user.join_date(), theme),
        field("Last login", user.last_login(), theme),
        field("Location", user.location_label(), theme),
        field("Avatar", user.avatar.clone(), theme),
    ];
    if !user.images.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Images", Style::default().fg(theme.muted)));
        lines.extend(user.images.iter().map(|i| Line::raw(format!("  {i}"))));
    }
    lines.push(Line::raw(""));
    let action = user.status.flip_action();
    lines.push(if busy {
        Line::styled("Update in progress…", Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC))
    } else {
        Line::styled(
            format!("s: {}   d: Delete   Esc: back", action.verb()),
            Style::default().fg(theme.accent),
        )
    });

    let card = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("User Profile")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(card, cols[0]);

    let sub = &user.subscription;
    let sub_lines = vec![
        field("Status", sub.status().to_string(), theme),
        field("Plan", sub.plan().to_string(), theme),
        field("Started", sub.start_date(), theme),
        field("Ends", sub.end_date(), theme),
        field("Renewal", sub.renewal().to_string(), theme),
        field("Price", sub.price().to_string(), theme),
    ];
    let sub_card = Paragraph::new(sub_lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Subscription")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(sub_card, cols[1]);
}
