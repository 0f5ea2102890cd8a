//! Rendering. `render` lays out header, sidebar, the active screen and the
//! status bar, then draws any open modal on top.
pub mod auth;
pub mod components;
pub mod dashboard;
pub mod reports;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table, TableState, Wrap};

use crate::app::{AppState, InputMode, ModalState, Screen, Theme};
use crate::controller::{ListController, LoadState};
use crate::records::Record;

const SIDEBAR_WIDTH: u16 = 26;

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());

    render_header(f, root[0], app);

    if app.screen == Screen::Login {
        auth::render_login(f, root[1], app);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(root[1]);
        render_sidebar(f, body[0], app);
        match app.screen {
            Screen::Dashboard => dashboard::render_dashboard(f, body[1], app),
            Screen::Profiles => users::render_profiles(f, body[1], app),
            Screen::Suspended => users::render_suspended(f, body[1], app),
            Screen::ProfileDetail => users::render_profile_detail(f, body[1], app),
            Screen::Verification => reports::render_verification(f, body[1], app),
            Screen::Reports => reports::render_reports(f, body[1], app),
            Screen::Moderation => reports::render_moderation(f, body[1], app),
            Screen::Login => {}
        }
    }

    components::render_status_bar(f, root[2], app);

    if let Some(state) = app.modal.clone() {
        render_modal(f, f.area(), app, &state);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let signed_in = if app.session.has_token() { "token set" } else { "no token" };
    let line = Line::from(vec![
        Span::styled("Blumdate", Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD)),
        Span::raw(" admin  "),
        Span::styled(app.screen.title(), Style::default().fg(app.theme.title)),
        Span::styled(
            format!("  {}  ({signed_in})", app.session.base_url()),
            Style::default().fg(app.theme.muted),
        ),
    ]);
    let p = Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &AppState) {
    let current = if app.screen == Screen::ProfileDetail {
        app.detail.as_ref().map(|d| d.return_to).unwrap_or(Screen::Profiles)
    } else {
        app.screen
    };
    let items: Vec<ListItem> = Screen::SIDEBAR
        .iter()
        .map(|s| {
            if *s == current {
                ListItem::new(format!("▶ {}", s.title())).style(
                    Style::default()
                        .fg(app.theme.highlight_fg)
                        .bg(app.theme.highlight_bg)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(format!("  {}", s.title())).style(Style::default().fg(app.theme.text))
            }
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .title("Menu")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(list, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    match state {
        ModalState::DeleteConfirm { .. } | ModalState::SuspendConfirm { .. } => {
            components::render_confirm_modal(f, area, app, state);
        }
        ModalState::ContentDetail { .. } => reports::render_content_modal(f, area, app, state),
        ModalState::Alert { .. } => components::render_alert_modal(f, area, app, state),
        ModalState::Help { scroll } => components::render_help_modal(f, area, app, *scroll),
    }
}

/// Centered single message inside a titled block; used for loading and error states.
pub(crate) fn render_notice(f: &mut Frame, area: Rect, theme: &Theme, title: &str, message: &str, style: Style) {
    let p = Paragraph::new(message.to_string())
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    f.render_widget(p, area);
}

/// Columns of a list screen.
pub(crate) struct Columns<'a, R> {
    pub header: Vec<&'a str>,
    pub widths: Vec<Constraint>,
    pub row: fn(&R, &Theme) -> Row<'static>,
}

/// Search bar, table window and pager footer for any list controller. The
/// loading and error states replace the table entirely.
pub(crate) fn render_list<R: Record>(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    title: &str,
    ctl: &ListController<R>,
    columns: Columns<'_, R>,
) {
    let theme = &app.theme;
    match ctl.state() {
        LoadState::Loading => {
            render_notice(f, area, theme, title, "Loading…", Style::default().fg(theme.muted));
            return;
        }
        LoadState::Failed(err) => {
            let style = if err.is_empty_result() {
                Style::default().fg(theme.muted)
            } else {
                Style::default().fg(theme.danger)
            };
            render_notice(f, area, theme, title, &err.user_message(), style);
            return;
        }
        LoadState::Ready => {}
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    render_search_bar(f, parts[0], app, ctl);

    let rows: Vec<Row> = ctl
        .window()
        .into_iter()
        .map(|r| {
            let row = (columns.row)(r, theme);
            if ctl.is_in_flight(r.id()) {
                row.style(Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC))
            } else {
                row
            }
        })
        .collect();
    let empty = rows.is_empty();
    let header = Row::new(columns.header.clone())
        .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD));
    let table = Table::new(rows, columns.widths.clone())
        .header(header)
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .style(Style::default().fg(theme.text))
        .row_highlight_style(
            Style::default()
                .fg(theme.highlight_fg)
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ")
        .column_spacing(1);
    let mut state = TableState::default();
    if !empty {
        state.select(Some(ctl.selected_index()));
    }
    f.render_stateful_widget(table, parts[1], &mut state);

    if empty {
        let inner = parts[1].inner(ratatui::layout::Margin { horizontal: 2, vertical: 2 });
        let msg = Paragraph::new(format!("No results for \"{}\".", ctl.applied_query()))
            .style(Style::default().fg(theme.muted));
        f.render_widget(msg, inner);
    }

    render_pager(f, parts[2], app, ctl);
}

fn render_search_bar<R: Record>(f: &mut Frame, area: Rect, app: &AppState, ctl: &ListController<R>) {
    let active = app.input_mode == InputMode::Search;
    let border = if active { app.theme.accent } else { app.theme.border };
    let mut spans = vec![Span::raw(ctl.input().to_string())];
    if active {
        spans.push(Span::styled("▏", Style::default().fg(app.theme.accent)));
    }
    if ctl.search_pending() {
        spans.push(Span::styled("  searching…", Style::default().fg(app.theme.muted)));
    }
    let p = Paragraph::new(Line::from(spans)).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Search (/)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

fn render_pager<R: Record>(f: &mut Frame, area: Rect, app: &AppState, ctl: &ListController<R>) {
    let jump = if app.input_mode == InputMode::PageJump {
        format!("   go to page: {}▏", app.page_input)
    } else {
        String::new()
    };
    let text = format!(
        "◀ Page {} of {} ▶   {} of {} records{jump}",
        ctl.page(),
        ctl.total_pages(),
        ctl.view_len(),
        ctl.collection().len(),
    );
    let p = Paragraph::new(text)
        .alignment(Alignment::Right)
        .style(Style::default().fg(app.theme.muted));
    f.render_widget(p, area);
}
