//! Event loop and state transitions.
//!
//! Key presses and network results are turned into state changes by the pure
//! functions [`handle_key`] and [`apply_event`]. Both return the [`Command`]s
//! that need a network call; [`dispatch`] runs those on the tokio runtime and
//! reports back over the event channel, so every state change happens on the
//! UI loop.
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing::{error, info, warn};

use crate::api::{ApiClient, AuthReply};
use crate::app::keymap::KeyAction;
use crate::app::{
    AppState, InputMode, ModalState, ProfileDetail, Screen, Target, VERIFICATION_UNAVAILABLE,
};
use crate::auth::{AuthMode, AuthOutcome, AuthStage, RESTRICTED};
use crate::config::Args;
use crate::controller::{ListController, LoadState};
use crate::error::AdminError;
use crate::records::{AccountStatus, BlockAction, Record, UserRecord};
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Work that needs the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    FetchDashboard,
    FetchProfiles,
    FetchSuspended,
    FetchReports,
    FetchContent,
    FetchDetail { id: String },
    Delete { id: String },
    SetBlocked { id: String, action: BlockAction },
    SendCredentials { email: String, mode: AuthMode },
    Verify { email: String, code: String },
    Resend { email: String },
}

/// Results delivered back to the UI loop.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Dashboard(Result<Vec<UserRecord>, AdminError>),
    Profiles(Result<Vec<UserRecord>, AdminError>),
    Suspended(Result<Vec<UserRecord>, AdminError>),
    Reports(Result<Vec<crate::records::ReportRecord>, AdminError>),
    Content(Result<Vec<crate::records::ContentRecord>, AdminError>),
    Detail { id: String, result: Result<UserRecord, AdminError> },
    Deleted { id: String, result: Result<(), AdminError> },
    /// `Ok(Some)` carries the re-fetched record; `Ok(None)` means the action
    /// succeeded but the refresh did not.
    Blocked { id: String, action: BlockAction, result: Result<Option<UserRecord>, AdminError> },
    Credentials(Result<AuthReply, AdminError>),
    Verified(Result<AuthReply, AdminError>),
    Resent(Result<AuthReply, AdminError>),
}

/// Run the TUI until the user quits.
pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, args: &Args) -> Result<()> {
    let mut app = AppState::from_args(args);
    let mut client = ApiClient::new(app.session.clone());
    let (tx, mut rx) = unbounded_channel::<AppEvent>();
    info!(screen = ?app.screen, base_url = app.session.base_url(), "starting");

    for cmd in mount(&mut app) {
        dispatch(&client, &tx, cmd);
    }

    loop {
        terminal.draw(|f| ui::render(f, &mut app))?;

        let mut commands = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            commands.extend(apply_event(&mut app, ev));
        }
        tick(&mut app, Instant::now());

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            commands.extend(handle_key(&mut app, key, Instant::now()));
        }

        if client.session() != &app.session {
            client.set_session(app.session.clone());
        }
        for cmd in commands {
            dispatch(&client, &tx, cmd);
        }
        if app.should_quit {
            break;
        }
    }
    info!(uptime_s = app.started_at.elapsed().as_secs(), "exiting");
    Ok(())
}

/// Spawn the network call for `cmd`; its result comes back as an [`AppEvent`].
pub fn dispatch(client: &ApiClient, tx: &UnboundedSender<AppEvent>, cmd: Command) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let ev = match cmd {
            Command::FetchDashboard => AppEvent::Dashboard(client.fetch_profiles().await),
            Command::FetchProfiles => AppEvent::Profiles(client.fetch_profiles().await),
            Command::FetchSuspended => AppEvent::Suspended(client.fetch_blocked_users().await),
            Command::FetchReports => AppEvent::Reports(client.fetch_reports().await),
            Command::FetchContent => AppEvent::Content(client.fetch_content().await),
            Command::FetchDetail { id } => {
                let result = client.fetch_profile(&id).await;
                AppEvent::Detail { id, result }
            }
            Command::Delete { id } => {
                let result = client.delete_profile(&id).await;
                AppEvent::Deleted { id, result }
            }
            Command::SetBlocked { id, action } => {
                let result = match client.set_blocked(&id, action).await {
                    Ok(()) => match client.fetch_profile(&id).await {
                        Ok(record) => Ok(Some(record)),
                        Err(e) => {
                            warn!(%id, error = %e, "refresh after block/unblock failed");
                            Ok(None)
                        }
                    },
                    Err(e) => Err(e),
                };
                AppEvent::Blocked { id, action, result }
            }
            Command::SendCredentials { email, mode } => AppEvent::Credentials(match mode {
                AuthMode::Login => client.login(&email).await,
                AuthMode::Register => client.register(&email).await,
            }),
            Command::Verify { email, code } => AppEvent::Verified(client.verify(&email, &code).await),
            Command::Resend { email } => AppEvent::Resent(client.resend_code(&email).await),
        };
        // The receiver only goes away when the UI loop has exited.
        let _ = tx.send(ev);
    });
}

/// Run pending debounced searches.
pub fn tick(app: &mut AppState, now: Instant) {
    app.profiles.tick(now);
    app.suspended.tick(now);
    app.verification.tick(now);
    app.reports.tick(now);
    app.moderation.tick(now);
}

/// Run `$body` against the list controller of the current screen.
macro_rules! on_list {
    ($app:expr, $c:ident => $body:expr) => {
        match $app.screen {
            Screen::Profiles => {
                let $c = &mut $app.profiles;
                Some($body)
            }
            Screen::Suspended => {
                let $c = &mut $app.suspended;
                Some($body)
            }
            Screen::Verification => {
                let $c = &mut $app.verification;
                Some($body)
            }
            Screen::Reports => {
                let $c = &mut $app.reports;
                Some($body)
            }
            Screen::Moderation => {
                let $c = &mut $app.moderation;
                Some($body)
            }
            _ => None,
        }
    };
}

/// Search and paging only apply to a list that loaded.
fn list_ready(app: &AppState) -> bool {
    match app.screen {
        Screen::Profiles => app.profiles.is_ready(),
        Screen::Suspended => app.suspended.is_ready(),
        Screen::Verification => app.verification.is_ready(),
        Screen::Reports => app.reports.is_ready(),
        Screen::Moderation => app.moderation.is_ready(),
        _ => false,
    }
}

/// Issue the initial fetch for the current screen if it has not had one.
pub fn mount(app: &mut AppState) -> Vec<Command> {
    let screen = app.screen;
    if screen == Screen::Login || !app.mounted.insert(screen) {
        return Vec::new();
    }
    let cmd = match screen {
        Screen::Dashboard => {
            app.dashboard.state = LoadState::Loading;
            Some(Command::FetchDashboard)
        }
        Screen::Profiles => {
            app.profiles.begin_load();
            Some(Command::FetchProfiles)
        }
        Screen::Suspended => {
            app.suspended.begin_load();
            Some(Command::FetchSuspended)
        }
        Screen::Reports => {
            app.reports.begin_load();
            Some(Command::FetchReports)
        }
        Screen::Moderation => {
            app.moderation.begin_load();
            Some(Command::FetchContent)
        }
        Screen::Verification => {
            warn!("verification requests endpoint is not available");
            app.verification.finish_load(Err(AdminError::application(
                Some(VERIFICATION_UNAVAILABLE.to_string()),
                VERIFICATION_UNAVAILABLE,
            )));
            None
        }
        Screen::ProfileDetail => {
            app.mounted.remove(&Screen::ProfileDetail);
            app.detail.as_mut().map(|d| {
                d.state = LoadState::Loading;
                Command::FetchDetail { id: d.id.clone() }
            })
        }
        Screen::Login => None,
    };
    cmd.into_iter().collect()
}

pub fn switch_screen(app: &mut AppState, screen: Screen) -> Vec<Command> {
    app.screen = screen;
    app.input_mode = InputMode::Normal;
    app.status = None;
    mount(app)
}

fn reload(app: &mut AppState) -> Vec<Command> {
    let screen = app.screen;
    app.mounted.remove(&screen);
    info!(?screen, "reload");
    mount(app)
}

fn open_detail(app: &mut AppState, id: String) -> Vec<Command> {
    let return_to = if app.screen == Screen::ProfileDetail {
        app.detail.as_ref().map(|d| d.return_to).unwrap_or(Screen::Profiles)
    } else {
        app.screen
    };
    app.detail = Some(ProfileDetail { id, state: LoadState::Loading, record: None, return_to });
    switch_screen(app, Screen::ProfileDetail)
}

fn close_detail(app: &mut AppState, to: Screen) -> Vec<Command> {
    app.detail = None;
    switch_screen(app, to)
}

/// Claim `id` for a mutation. The same account can be listed on Profiles and
/// Suspended at once, so the claim covers both lists.
fn begin_user_mutation(app: &mut AppState, id: &str) -> bool {
    if app.profiles.is_in_flight(id) || app.suspended.is_in_flight(id) {
        return false;
    }
    app.profiles.begin_mutation(id);
    app.suspended.begin_mutation(id);
    true
}

fn end_user_mutation(app: &mut AppState, id: &str) {
    app.profiles.end_mutation(id);
    app.suspended.end_mutation(id);
}

/// Account the destructive actions apply to on the current screen.
fn selected_user(app: &AppState) -> Option<UserRecord> {
    match app.screen {
        Screen::Profiles => app.profiles.selected().cloned(),
        Screen::Suspended => app.suspended.selected().cloned(),
        Screen::ProfileDetail => app.detail.as_ref().and_then(|d| d.record.clone()),
        _ => None,
    }
}

// ---- keys ----

pub fn handle_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Vec<Command> {
    match app.input_mode {
        InputMode::Login => handle_login_key(app, key),
        InputMode::Modal => handle_modal_key(app, key),
        InputMode::Search => {
            handle_search_key(app, key, now);
            Vec::new()
        }
        InputMode::PageJump => {
            handle_page_jump_key(app, key);
            Vec::new()
        }
        InputMode::Normal => match app.keymap.resolve(&key) {
            Some(action) => handle_action(app, action),
            None => Vec::new(),
        },
    }
}

fn handle_action(app: &mut AppState, action: KeyAction) -> Vec<Command> {
    match action {
        KeyAction::Quit => app.should_quit = true,
        KeyAction::OpenHelp => app.open_modal(ModalState::Help { scroll: 0 }),
        KeyAction::StartSearch => {
            if list_ready(app) {
                app.input_mode = InputMode::Search;
            }
        }
        KeyAction::Reload => return reload(app),
        KeyAction::NextScreen => return switch_screen(app, app.screen.cycle(true)),
        KeyAction::PrevScreen => return switch_screen(app, app.screen.cycle(false)),
        KeyAction::MoveUp => {
            on_list!(app, c => c.select_prev());
        }
        KeyAction::MoveDown => {
            on_list!(app, c => c.select_next());
        }
        KeyAction::PrevPage if list_ready(app) => {
            on_list!(app, c => c.prev_page());
        }
        KeyAction::NextPage if list_ready(app) => {
            on_list!(app, c => c.next_page());
        }
        KeyAction::FirstPage if list_ready(app) => {
            on_list!(app, c => c.jump_to_page(1));
        }
        KeyAction::LastPage if list_ready(app) => {
            on_list!(app, c => {
                let last = c.total_pages();
                c.jump_to_page(last)
            });
        }
        KeyAction::JumpToPage => {
            if list_ready(app) {
                app.page_input.clear();
                app.input_mode = InputMode::PageJump;
            }
        }
        KeyAction::OpenSelection => return open_selection(app),
        KeyAction::DeleteSelection => {
            if matches!(app.screen, Screen::Profiles | Screen::ProfileDetail)
                && let Some(user) = selected_user(app)
            {
                let target = Target { id: user.id, name: user.name };
                app.open_modal(ModalState::DeleteConfirm { target, selected: 1 });
            }
        }
        KeyAction::ToggleSuspend => {
            if let Some(user) = selected_user(app) {
                let action = user.status.flip_action();
                let target = Target { id: user.id, name: user.name };
                app.open_modal(ModalState::SuspendConfirm { target, action, selected: 1 });
            }
        }
        KeyAction::Back => {
            if app.screen == Screen::ProfileDetail {
                let to = app.detail.as_ref().map(|d| d.return_to).unwrap_or(Screen::Profiles);
                return close_detail(app, to);
            }
            app.status = None;
        }
        KeyAction::PrevPage
        | KeyAction::NextPage
        | KeyAction::FirstPage
        | KeyAction::LastPage
        | KeyAction::Ignore => {}
    }
    Vec::new()
}

fn open_selection(app: &mut AppState) -> Vec<Command> {
    match app.screen {
        Screen::Profiles | Screen::Suspended => {
            if let Some(user) = selected_user(app) {
                return open_detail(app, user.id);
            }
        }
        Screen::Moderation => {
            if let Some(id) = app.moderation.selected().map(|c| c.id().to_string()) {
                app.open_modal(ModalState::ContentDetail { id });
            }
        }
        Screen::Verification => {
            if let Some(req) = app.verification.selected() {
                info!(id = %req.id, "verification review requested");
                let msg = format!("Review for {} is not available yet.", req.name);
                app.set_status(msg);
            }
        }
        _ => {}
    }
    Vec::new()
}

fn handle_search_key(app: &mut AppState, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Enter => {
            on_list!(app, c => c.apply_search());
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            on_list!(app, c => {
                c.set_input("", now);
                c.apply_search();
            });
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            on_list!(app, c => c.pop_char(now));
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            on_list!(app, c => c.push_char(ch, now));
        }
        _ => {}
    }
}

fn handle_page_jump_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() && app.page_input.len() < 6 => app.page_input.push(c),
        KeyCode::Backspace => {
            app.page_input.pop();
        }
        KeyCode::Enter => {
            let requested = app.page_input.parse::<usize>().unwrap_or(0);
            let moved = on_list!(app, c => c.jump_to_page(requested)).unwrap_or(false);
            if !moved {
                let total = on_list!(app, c => c.total_pages()).unwrap_or(1);
                let msg = format!("Page {} is not between 1 and {}.", app.page_input, total);
                app.set_status(msg);
            }
            app.page_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.page_input.clear();
            app.input_mode = InputMode::Normal;
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) -> Vec<Command> {
    let Some(modal) = app.modal.as_mut() else {
        app.close_modal();
        return Vec::new();
    };
    match modal {
        ModalState::DeleteConfirm { selected, .. } | ModalState::SuspendConfirm { selected, .. } => {
            match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                    *selected = 1 - (*selected).min(1);
                }
                KeyCode::Char('y') => return confirm_modal(app),
                KeyCode::Enter if *selected == 0 => return confirm_modal(app),
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') => app.close_modal(),
                _ => {}
            }
        }
        ModalState::Help { scroll } => match key.code {
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => app.close_modal(),
            _ => {}
        },
        ModalState::ContentDetail { .. } | ModalState::Alert { .. } => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.close_modal();
            }
        }
    }
    Vec::new()
}

/// Confirmed delete or suspend: close the dialog and send the request unless
/// one is already pending for the record.
fn confirm_modal(app: &mut AppState) -> Vec<Command> {
    let Some(modal) = app.modal.take() else { return Vec::new() };
    app.close_modal();
    let (target, cmd) = match modal {
        ModalState::DeleteConfirm { target, .. } => {
            let cmd = Command::Delete { id: target.id.clone() };
            (target, cmd)
        }
        ModalState::SuspendConfirm { target, action, .. } => {
            let cmd = Command::SetBlocked { id: target.id.clone(), action };
            (target, cmd)
        }
        _ => return Vec::new(),
    };
    if !begin_user_mutation(app, &target.id) {
        app.set_status(format!("An update for {} is already in progress.", target.name));
        return Vec::new();
    }
    info!(id = %target.id, ?cmd, "mutation confirmed");
    vec![cmd]
}

fn handle_login_key(app: &mut AppState, key: KeyEvent) -> Vec<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Vec::new();
    }
    let auth = &mut app.auth;
    match (auth.stage(), key.code) {
        (AuthStage::AwaitingCredentials, KeyCode::Char(c)) if !auth.is_busy() => auth.email.push(c),
        (AuthStage::AwaitingCredentials, KeyCode::Backspace) if !auth.is_busy() => {
            auth.email.pop();
        }
        (AuthStage::AwaitingCredentials, KeyCode::Tab) => auth.toggle_mode(),
        (AuthStage::AwaitingCredentials, KeyCode::Enter) => {
            if let Some(email) = auth.submit_email() {
                return vec![Command::SendCredentials { email, mode: auth.mode }];
            }
        }
        (AuthStage::AwaitingCode, KeyCode::Char('r')) => {
            if let Some(email) = auth.request_resend() {
                return vec![Command::Resend { email }];
            }
        }
        (AuthStage::AwaitingCode, KeyCode::Char(c)) => {
            auth.otp.push(c);
        }
        (AuthStage::AwaitingCode, KeyCode::Backspace) => auth.otp.pop(),
        (AuthStage::AwaitingCode, KeyCode::Esc) => auth.cancel_code(),
        (AuthStage::AwaitingCode, KeyCode::Enter) => {
            if let Some((email, code)) = auth.submit_code() {
                return vec![Command::Verify { email, code }];
            }
        }
        _ => {}
    }
    Vec::new()
}

// ---- network results ----

pub fn apply_event(app: &mut AppState, ev: AppEvent) -> Vec<Command> {
    match ev {
        AppEvent::Dashboard(result) => app.dashboard.finish_load(result),
        AppEvent::Profiles(result) => app.profiles.finish_load(result),
        AppEvent::Suspended(result) => app.suspended.finish_load(result),
        AppEvent::Reports(result) => app.reports.finish_load(result),
        AppEvent::Content(result) => app.moderation.finish_load(result),
        AppEvent::Detail { id, result } => {
            if let Some(detail) = app.detail.as_mut().filter(|d| d.id == id) {
                match result {
                    Ok(record) => {
                        detail.record = Some(record);
                        detail.state = LoadState::Ready;
                    }
                    Err(err) => {
                        warn!(%id, error = %err, "profile load failed");
                        detail.record = None;
                        detail.state = LoadState::Failed(err);
                    }
                }
            }
        }
        AppEvent::Deleted { id, result } => return on_deleted(app, id, result),
        AppEvent::Blocked { id, action, result } => on_blocked(app, id, action, result),
        AppEvent::Credentials(reply) => {
            let outcome = app.auth.on_credentials_reply(reply);
            return on_auth_outcome(app, outcome);
        }
        AppEvent::Verified(reply) => {
            let outcome = app.auth.on_verify_reply(reply);
            return on_auth_outcome(app, outcome);
        }
        AppEvent::Resent(reply) => {
            let outcome = app.auth.on_resend_reply(reply);
            return on_auth_outcome(app, outcome);
        }
    }
    Vec::new()
}

fn on_deleted(app: &mut AppState, id: String, result: Result<(), AdminError>) -> Vec<Command> {
    end_user_mutation(app, &id);
    match result {
        Ok(()) => {
            let removed = app.profiles.remove(&id).or(app.suspended.remove(&id));
            let name = removed.map(|u| u.name).unwrap_or_else(|| id.clone());
            app.set_status(format!("Deleted {name}."));
            if app.detail.as_ref().is_some_and(|d| d.id == id) {
                return close_detail(app, Screen::Profiles);
            }
        }
        Err(err) => {
            error!(%id, error = %err, "failed to delete user");
            app.set_status(format!("Failed to delete user: {}", err.user_message()));
        }
    }
    Vec::new()
}

fn on_blocked(
    app: &mut AppState,
    id: String,
    action: BlockAction,
    result: Result<Option<UserRecord>, AdminError>,
) {
    end_user_mutation(app, &id);
    let refreshed = match result {
        Ok(refreshed) => refreshed,
        Err(err) => {
            error!(%id, action = action.as_str(), error = %err, "failed to suspend/unblock user");
            app.set_status(format!("Failed to {} user: {}", action.verb().to_lowercase(), err.user_message()));
            return;
        }
    };
    let status = match action {
        BlockAction::Block => AccountStatus::Suspended,
        BlockAction::Unblock => AccountStatus::Active,
    };
    let apply = |c: &mut ListController<UserRecord>| match &refreshed {
        Some(record) => c.replace(record.clone()),
        None => c.update(&id, |u| u.status = status),
    };
    apply(&mut app.profiles);
    if status == AccountStatus::Active {
        app.suspended.remove(&id);
    } else {
        apply(&mut app.suspended);
    }
    let mut name = None;
    if let Some(detail) = app.detail.as_mut().filter(|d| d.id == id) {
        match &refreshed {
            Some(record) => detail.record = Some(record.clone()),
            None => {
                if let Some(record) = detail.record.as_mut() {
                    record.status = status;
                }
            }
        }
        name = detail.record.as_ref().map(|u| u.name.clone());
    }
    let name = name
        .or_else(|| app.profiles.find(&id).map(|u| u.name.clone()))
        .unwrap_or(id);
    let verb = match action {
        BlockAction::Block => "suspended",
        BlockAction::Unblock => "unblocked",
    };
    info!(%name, verb, refreshed = refreshed.is_some(), "account status changed");
    app.set_status(format!("{name} {verb}."));
}

fn on_auth_outcome(app: &mut AppState, outcome: AuthOutcome) -> Vec<Command> {
    match outcome {
        AuthOutcome::Authenticated { token } => {
            if let Some(token) = token.as_deref() {
                app.session = app.session.established_by_login(token);
            }
            if !app.session.has_token() {
                warn!("signed in but no token is available; admin calls will fail");
            }
            switch_screen(app, Screen::Dashboard)
        }
        AuthOutcome::Restricted => {
            app.open_modal(ModalState::Alert {
                title: "Restricted access".to_string(),
                message: RESTRICTED.to_string(),
            });
            Vec::new()
        }
        AuthOutcome::CodeRequested | AuthOutcome::Message(_) | AuthOutcome::Idle => Vec::new(),
    }
}
