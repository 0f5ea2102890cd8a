// Integration tests for blumdate-admin

use std::time::{Duration, Instant};

use blumdate_admin::api::{ApiClient, AuthReply};
use blumdate_admin::app::keymap::Keymap;
use blumdate_admin::app::update::{
    AppEvent, Command, apply_event, dispatch, handle_key, mount, switch_screen,
};
use blumdate_admin::app::{AppState, InputMode, ModalState, Screen, Theme};
use blumdate_admin::controller::LoadState;
use blumdate_admin::error::AdminError;
use blumdate_admin::records::{
    AccountStatus, AccountType, BlockAction, Subscription, UserRecord,
};
use blumdate_admin::session::Session;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const TOKEN: &str = "test-token";

fn user(i: usize) -> UserRecord {
    UserRecord {
        id: format!("u{i}"),
        name: format!("User {i:02}"),
        email: format!("user{i}@blumdate.test"),
        account_type: AccountType::Free,
        status: AccountStatus::Active,
        joined_at: None,
        last_login_at: None,
        location: None,
        avatar: String::new(),
        images: Vec::new(),
        subscription: Subscription { premium: false, started_at: None, renewed_at: None },
    }
}

fn app_on(screen: Screen) -> AppState {
    let session = Session::new(Some("http://127.0.0.1:9/api/v1".into()), Some(TOKEN.into()));
    let mut app = AppState::new(
        session,
        Theme::blumdate(),
        Keymap::new_defaults(),
        10,
        Duration::from_millis(300),
    );
    app.screen = screen;
    if screen == Screen::Login {
        app.input_mode = InputMode::Login;
    }
    app
}

fn press(app: &mut AppState, code: KeyCode) -> Vec<Command> {
    handle_key(app, KeyEvent::new(code, KeyModifiers::NONE), Instant::now())
}

fn type_text(app: &mut AppState, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

// ---- stub backend ----

#[derive(Clone)]
struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: String,
}

fn route(method: &'static str, path: &'static str, status: u16, body: serde_json::Value) -> Route {
    Route { method, path, status, body: body.to_string() }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Minimal HTTP/1.1 server answering each request from `routes`. Routes with
/// a `/admin` path reject requests that lack the bearer token.
async fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                loop {
                    let n = sock.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = find_header_end(&buf) {
                        let head = String::from_utf8_lossy(&buf[..pos]).to_string();
                        if buf.len() >= pos + 4 + content_length(&head) {
                            break;
                        }
                    }
                }
                let text = String::from_utf8_lossy(&buf).to_string();
                let mut first = text.split_whitespace();
                let method = first.next().unwrap_or("");
                let path = first.next().unwrap_or("");
                let path = path.strip_prefix("/api/v1").unwrap_or(path);
                let authed = text.to_lowercase().contains(&format!("authorization: bearer {TOKEN}"));
                let (status, body) = match routes.iter().find(|r| r.method == method && r.path == path) {
                    Some(r) if r.path.starts_with("/admin") && !authed => (401, "{}".to_string()),
                    Some(r) => (r.status, r.body.clone()),
                    None => (404, "{}".to_string()),
                };
                let resp = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    format!("http://{addr}/api/v1")
}

fn client(base: String) -> ApiClient {
    ApiClient::new(Session::new(Some(base), Some(TOKEN.into())))
}

// 1) Profiles envelope with mixed-case status and an unpopulated user
#[tokio::test]
async fn fetch_profiles_accepts_any_status_case() {
    let base = serve(vec![route(
        "GET",
        "/admin/profiles",
        200,
        serde_json::json!({
            "status": "Success",
            "data": {"profiles": [
                {"userId": {"_id": "a1", "firstName": "Ada", "lastName": "Lovelace",
                            "email": "ada@blumdate.test", "premium": true, "isBlocked": false,
                            "createdAt": "2024-07-01T09:00:00Z"},
                 "images": ["uploads/a.png"]},
                {"userId": "not-populated"}
            ]}
        }),
    )])
    .await;
    let users = client(base).fetch_profiles().await.expect("profiles");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "a1");
    assert_eq!(users[0].name, "Ada Lovelace");
    assert_eq!(users[0].account_type, AccountType::Premium);
    assert_eq!(users[0].join_date(), "July 1, 2024");
    assert_eq!(users[0].images, vec!["uploads/a.png".to_string()]);
}

// 2) A 404 names the endpoint
#[tokio::test]
async fn missing_endpoint_maps_to_not_found() {
    let base = serve(Vec::new()).await;
    let err = client(base).fetch_reports().await.unwrap_err();
    assert_eq!(err, AdminError::NotFound { resource: "reports".into() });
    assert_eq!(
        err.user_message(),
        "Resource not found. The /reports endpoint returned a 404 error."
    );
}

// 3) Non-success envelope carries the server message, or the fallback
#[tokio::test]
async fn failed_envelope_is_application_error() {
    let base = serve(vec![
        route("GET", "/reports", 200, serde_json::json!({"status": "fail", "message": "Token expired"})),
        route("GET", "/users", 200, serde_json::json!({"status": "error"})),
    ])
    .await;
    let c = client(base);
    assert_eq!(
        c.fetch_reports().await.unwrap_err(),
        AdminError::Application { message: "Token expired".into() }
    );
    assert_eq!(
        c.fetch_content().await.unwrap_err().user_message(),
        "Failed to fetch user content."
    );
}

// 4) Other HTTP failures are transport errors with a generic message
#[tokio::test]
async fn server_error_is_transport_error() {
    let base = serve(vec![route("GET", "/admin/users/blocked", 500, serde_json::json!({}))]).await;
    let err = client(base).fetch_blocked_users().await.unwrap_err();
    assert!(matches!(err, AdminError::Transport { .. }));
    assert_eq!(err.user_message(), "Failed to fetch suspended users. Please try again later.");
}

// 4b) Only 200 counts as a delivered collection
#[tokio::test]
async fn non_ok_success_codes_are_transport_errors() {
    let base = serve(vec![route(
        "GET",
        "/reports",
        202,
        serde_json::json!({"status": "success", "data": []}),
    )])
    .await;
    let err = client(base).fetch_reports().await.unwrap_err();
    assert!(matches!(err, AdminError::Transport { .. }));
}

// 4c) One malformed user does not hide the rest of the page
#[tokio::test]
async fn malformed_fields_do_not_drop_other_rows() {
    let base = serve(vec![route(
        "GET",
        "/admin/profiles",
        200,
        serde_json::json!({"status": "success", "data": {"profiles": [
            {"userId": {"_id": "a1", "firstName": "Ada", "premium": null, "createdAt": ""}},
            {"userId": {"_id": "a2", "firstName": "Grace", "premium": true,
                        "createdAt": "2024-08-15T10:00:00Z"}},
            {"userId": {"_id": "a3", "firstName": ["not", "a", "name"]}}
        ]}}),
    )])
    .await;
    let users = client(base).fetch_profiles().await.expect("profiles");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].account_type, AccountType::Free);
    assert_eq!(users[0].join_date(), "N/A");
    assert_eq!(users[1].account_type, AccountType::Premium);
}

// 5) Empty collection reaches the screen as the empty-result notice
#[tokio::test]
async fn empty_blocked_list_shows_empty_message() {
    let base = serve(vec![route(
        "GET",
        "/admin/users/blocked",
        200,
        serde_json::json!({"status": "success", "data": [
            {"_id": "x", "email": "active@blumdate.test", "isBlocked": false}
        ]}),
    )])
    .await;
    let mut app = app_on(Screen::Suspended);
    let result = client(base).fetch_blocked_users().await;
    apply_event(&mut app, AppEvent::Suspended(result));
    match app.suspended.state() {
        LoadState::Failed(err) => assert_eq!(err.user_message(), "No suspended users found."),
        other => panic!("unexpected state {other:?}"),
    }
}

// 6) Block, then refresh the row from the profile endpoint
#[tokio::test]
async fn block_refreshes_record_from_server() {
    let base = serve(vec![
        route(
            "POST",
            "/admin/user/blockandunblock/u1",
            200,
            serde_json::json!({"status": "success", "message": "User blocked"}),
        ),
        route(
            "GET",
            "/admin/profile/u1",
            200,
            serde_json::json!({"status": "success", "data": {"userId": {
                "_id": "u1", "firstName": "User", "lastName": "01",
                "email": "user1@blumdate.test", "isBlocked": true
            }}}),
        ),
    ])
    .await;
    let c = client(base);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    dispatch(&c, &tx, Command::SetBlocked { id: "u1".into(), action: BlockAction::Block });
    let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event in time")
        .expect("event");

    let mut app = app_on(Screen::Profiles);
    apply_event(&mut app, AppEvent::Profiles(Ok((0..3).map(user).collect())));
    assert!(app.profiles.begin_mutation("u1"));
    match &ev {
        AppEvent::Blocked { result: Ok(Some(record)), .. } => {
            assert_eq!(record.status, AccountStatus::Suspended);
        }
        other => panic!("unexpected event {other:?}"),
    }
    apply_event(&mut app, ev);
    assert_eq!(app.profiles.find("u1").map(|u| u.status), Some(AccountStatus::Suspended));
    assert!(!app.profiles.is_in_flight("u1"));
    assert_eq!(app.status.as_deref(), Some("User 01 suspended."));
}

// 7) Auth failures surface the server message
#[tokio::test]
async fn rejected_login_keeps_server_message() {
    let base = serve(vec![route(
        "POST",
        "/auth/login",
        400,
        serde_json::json!({"status": "fail", "message": "No account with that email"}),
    )])
    .await;
    let err = client(base).login("ghost@blumdate.test").await.unwrap_err();
    assert_eq!(err.user_message(), "No account with that email");
}

// 8) Paging, delete confirmation and the in-flight guard
#[test]
fn delete_flow_guards_duplicate_requests() {
    let mut app = app_on(Screen::Profiles);
    assert_eq!(mount(&mut app), vec![Command::FetchProfiles]);
    apply_event(&mut app, AppEvent::Profiles(Ok((0..25).map(user).collect())));
    assert_eq!(app.profiles.total_pages(), 3);

    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.profiles.page(), 3);

    press(&mut app, KeyCode::Char('d'));
    assert!(matches!(app.modal, Some(ModalState::DeleteConfirm { selected: 1, .. })));
    assert_eq!(press(&mut app, KeyCode::Char('y')), vec![Command::Delete { id: "u20".into() }]);
    assert_eq!(app.input_mode, InputMode::Normal);

    // Second confirmation while the first is pending sends nothing.
    press(&mut app, KeyCode::Char('d'));
    assert!(press(&mut app, KeyCode::Char('y')).is_empty());
    assert_eq!(app.status.as_deref(), Some("An update for User 20 is already in progress."));

    apply_event(&mut app, AppEvent::Deleted { id: "u20".into(), result: Ok(()) });
    assert_eq!(app.profiles.collection().len(), 24);
    assert_eq!(app.status.as_deref(), Some("Deleted User 20."));
    assert!(!app.profiles.is_in_flight("u20"));
}

// 8b) The same account listed on both user screens shares one pending request
#[test]
fn suspend_guard_spans_both_user_lists() {
    let mut blocked = user(1);
    blocked.status = AccountStatus::Suspended;

    let mut app = app_on(Screen::Suspended);
    apply_event(&mut app, AppEvent::Suspended(Ok(vec![blocked.clone()])));
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(
        press(&mut app, KeyCode::Char('y')),
        vec![Command::SetBlocked { id: "u1".into(), action: BlockAction::Unblock }]
    );

    assert_eq!(switch_screen(&mut app, Screen::Profiles), vec![Command::FetchProfiles]);
    apply_event(&mut app, AppEvent::Profiles(Ok(vec![blocked, user(2)])));
    assert!(app.profiles.is_in_flight("u1"));
    press(&mut app, KeyCode::Char('s'));
    assert!(press(&mut app, KeyCode::Char('y')).is_empty());
    assert_eq!(app.status.as_deref(), Some("An update for User 01 is already in progress."));

    apply_event(
        &mut app,
        AppEvent::Blocked { id: "u1".into(), action: BlockAction::Unblock, result: Ok(None) },
    );
    assert!(!app.profiles.is_in_flight("u1"));
    assert!(!app.suspended.is_in_flight("u1"));
    assert_eq!(app.profiles.find("u1").map(|u| u.status), Some(AccountStatus::Active));
    assert!(app.suspended.find("u1").is_none());
}

// 9) Cancelled suspend sends nothing; a failed refresh still flips the status
#[test]
fn suspend_flow_updates_locally_without_refresh() {
    let mut app = app_on(Screen::Profiles);
    apply_event(&mut app, AppEvent::Profiles(Ok((0..3).map(user).collect())));

    press(&mut app, KeyCode::Char('s'));
    assert!(press(&mut app, KeyCode::Enter).is_empty());
    assert!(app.modal.is_none());

    press(&mut app, KeyCode::Char('s'));
    press(&mut app, KeyCode::Left);
    let cmds = press(&mut app, KeyCode::Enter);
    assert_eq!(cmds, vec![Command::SetBlocked { id: "u0".into(), action: BlockAction::Block }]);

    apply_event(
        &mut app,
        AppEvent::Blocked { id: "u0".into(), action: BlockAction::Block, result: Ok(None) },
    );
    assert_eq!(app.profiles.find("u0").map(|u| u.status), Some(AccountStatus::Suspended));
    assert_eq!(app.status.as_deref(), Some("User 00 suspended."));
}

// 10) Non-admin verification is refused with an alert
#[test]
fn non_admin_sign_in_is_restricted() {
    let mut app = app_on(Screen::Login);
    type_text(&mut app, "mod@blumdate.test");
    let cmds = press(&mut app, KeyCode::Enter);
    assert!(matches!(cmds.as_slice(), [Command::SendCredentials { .. }]));

    let sent = AuthReply { message: Some("Verification code sent to your email".into()), ..Default::default() };
    apply_event(&mut app, AppEvent::Credentials(Ok(sent)));
    type_text(&mut app, "12a3456");
    let cmds = press(&mut app, KeyCode::Enter);
    assert_eq!(
        cmds,
        vec![Command::Verify { email: "mod@blumdate.test".into(), code: "123456".into() }]
    );

    let verified = AuthReply { token: Some("jwt".into()), role: Some("user".into()), ..Default::default() };
    apply_event(&mut app, AppEvent::Verified(Ok(verified)));
    assert_eq!(app.screen, Screen::Login);
    assert!(matches!(app.modal, Some(ModalState::Alert { .. })));
}

// 11) Admin verification stores the token and opens the dashboard
#[test]
fn admin_sign_in_opens_dashboard() {
    let mut app = app_on(Screen::Login);
    app.session = Session::new(None, None);
    type_text(&mut app, "admin@blumdate.test");
    press(&mut app, KeyCode::Enter);
    let sent = AuthReply { message: Some("Verification code sent".into()), ..Default::default() };
    apply_event(&mut app, AppEvent::Credentials(Ok(sent)));
    type_text(&mut app, "654321");
    press(&mut app, KeyCode::Enter);

    let verified = AuthReply { token: Some("jwt".into()), role: Some("super-admin".into()), ..Default::default() };
    let cmds = apply_event(&mut app, AppEvent::Verified(Ok(verified)));
    assert_eq!(app.screen, Screen::Dashboard);
    assert!(app.session.has_token());
    assert_eq!(cmds, vec![Command::FetchDashboard]);
}

// 12) Network failure on a list screen shows the generic transport message
#[test]
fn network_error_shows_retry_message() {
    let mut app = app_on(Screen::Reports);
    mount(&mut app);
    apply_event(
        &mut app,
        AppEvent::Reports(Err(AdminError::transport("reports", "connection refused"))),
    );
    match app.reports.state() {
        LoadState::Failed(err) => {
            assert_eq!(err.user_message(), "Failed to fetch reports. Please try again later.")
        }
        other => panic!("unexpected state {other:?}"),
    }

    // Only the error is shown: search and paging stay closed.
    press(&mut app, KeyCode::Char('/'));
    assert_eq!(app.input_mode, InputMode::Normal);
    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.input_mode, InputMode::Normal);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.reports.page(), 1);
}

// 13) Every screen renders on a small terminal
#[test]
fn screens_render_without_panicking() {
    use ratatui::{Terminal, backend::TestBackend};

    let mut app = app_on(Screen::Dashboard);
    let users: Vec<UserRecord> = (0..12).map(user).collect();
    apply_event(&mut app, AppEvent::Dashboard(Ok(users.clone())));
    apply_event(&mut app, AppEvent::Profiles(Ok(users)));
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
    for screen in [
        Screen::Login,
        Screen::Dashboard,
        Screen::Profiles,
        Screen::Suspended,
        Screen::Verification,
        Screen::Reports,
        Screen::Moderation,
    ] {
        app.screen = screen;
        mount(&mut app);
        terminal
            .draw(|f| blumdate_admin::ui::render(f, &mut app))
            .expect("draw");
    }
    app.open_modal(ModalState::Help { scroll: 0 });
    terminal
        .draw(|f| blumdate_admin::ui::render(f, &mut app))
        .expect("draw help");
}

// 14) Theme config roundtrip and init
#[test]
fn theme_roundtrip_and_init() {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("blumdate_theme_{}_{nonce}.conf", std::process::id()));
    let path_str = path.to_string_lossy().to_string();

    // Named ANSI colors survive a write/read cycle as well as hex ones.
    for theme in [Theme::dark(), Theme::blumdate()] {
        theme.write_file(&path_str).expect("write theme");
        let read = Theme::from_file(&path_str).expect("read theme");
        assert_eq!(read, theme);
    }

    let mut init = PathBuf::from(&path_str);
    init.set_extension("init.conf");
    let init_str = init.to_string_lossy().to_string();
    let _ = std::fs::remove_file(&init_str);
    let created = Theme::load_or_init(&init_str);
    assert!(init.exists());
    assert_eq!(Theme::from_file(&init_str), Some(created));

    let _ = std::fs::remove_file(&path_str);
    let _ = std::fs::remove_file(&init_str);
}
