use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};

use crate::app::AppState;
use crate::controller::LoadState;
use crate::ui::render_notice;

pub fn render_dashboard(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(8)])
        .split(area);

    match &app.dashboard.state {
        LoadState::Loading => {
            render_notice(f, area, theme, "Dashboard", "Loading…", Style::default().fg(theme.muted));
            return;
        }
        LoadState::Failed(err) => {
            // Totals read zero and the chart is flat; the error sits above them.
            let msg = err.user_message();
            render_notice(f, rows[0], theme, "Dashboard", &msg, Style::default().fg(theme.danger));
        }
        LoadState::Ready => {
            let cards = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 3); 3])
                .split(rows[0]);
            let totals = &app.dashboard.totals;
            let stats = [
                ("Total users", totals.users, theme.title),
                ("Premium users", totals.premium, theme.accent),
                ("Suspended", totals.suspended, theme.danger),
            ];
            for (i, (label, value, color)) in stats.into_iter().enumerate() {
                let p = Paragraph::new(vec![
                    Line::styled(value.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                    Line::styled(label, Style::default().fg(theme.muted)),
                ])
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(theme.border)),
                );
                f.render_widget(p, cards[i]);
            }
        }
    }

    let bars: Vec<Bar> = app
        .dashboard
        .chart
        .iter()
        .map(|b| {
            Bar::default()
                .value(b.premium_signups)
                .label(Line::from(b.label()))
                .style(Style::default().fg(theme.accent))
                .value_style(Style::default().fg(theme.text).bg(theme.accent))
        })
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Premium sign-ups per month")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1);
    f.render_widget(chart, rows[1]);
}
