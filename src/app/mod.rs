//! Application state types and entry glue.
//!
//! Defines the screens, input modes and modal dialogs of the TUI, the
//! [`AppState`] that holds one list controller per screen, and the theme.
//! The event loop lives in [`update`] and is re-exported as `run`.
//!
pub mod keymap;
pub mod update;

use std::collections::HashSet;
use std::time::Instant;

use ratatui::style::Color;

use crate::auth::{AuthFlow, AuthMode};
use crate::config::{Args, StartScreen};
use crate::controller::{ListController, LoadState};
use crate::dashboard::{self, MonthBucket, Totals};
use crate::error::AdminError;
use crate::records::{BlockAction, ContentRecord, ReportRecord, UserRecord, VerificationRequest};
use crate::session::Session;
use keymap::Keymap;

/// Message shown on the verification screen until the backend grows an endpoint.
pub const VERIFICATION_UNAVAILABLE: &str = "Error fetching verification requests: API not available yet. Please contact support if this persists.";

/// Screens reachable from the sidebar, plus the two that are not.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Dashboard,
    Profiles,
    ProfileDetail,
    Suspended,
    Verification,
    Reports,
    Moderation,
}

impl Screen {
    /// Sidebar order; Tab cycles through these.
    pub const SIDEBAR: [Screen; 6] = [
        Screen::Dashboard,
        Screen::Profiles,
        Screen::Suspended,
        Screen::Verification,
        Screen::Reports,
        Screen::Moderation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Dashboard => "Dashboard",
            Self::Profiles => "User Profiles",
            Self::ProfileDetail => "User Profile",
            Self::Suspended => "Suspended Users",
            Self::Verification => "Verification Requests",
            Self::Reports => "User Reports",
            Self::Moderation => "Content Moderation",
        }
    }

    /// Next (or previous) sidebar entry. The detail view cycles from the profiles list.
    pub fn cycle(self, forward: bool) -> Self {
        let here = if self == Self::ProfileDetail { Self::Profiles } else { self };
        let n = Self::SIDEBAR.len();
        let idx = Self::SIDEBAR.iter().position(|s| *s == here).unwrap_or(0);
        let next = if forward { (idx + 1) % n } else { (idx + n - 1) % n };
        Self::SIDEBAR[next]
    }

    pub fn has_list(self) -> bool {
        matches!(
            self,
            Self::Profiles | Self::Suspended | Self::Verification | Self::Reports | Self::Moderation
        )
    }
}

impl From<StartScreen> for Screen {
    fn from(s: StartScreen) -> Self {
        match s {
            StartScreen::Login => Self::Login,
            StartScreen::Dashboard => Self::Dashboard,
            StartScreen::Profiles => Self::Profiles,
            StartScreen::Suspended => Self::Suspended,
            StartScreen::Verification => Self::Verification,
            StartScreen::Reports => Self::Reports,
            StartScreen::Moderation => Self::Moderation,
        }
    }
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    PageJump,
    Login,
    Modal,
}

/// Record a destructive dialog acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub name: String,
}

/// Modal dialogs. `selected` is the focused button: 0 = confirm, 1 = cancel.
#[derive(Clone, Debug, PartialEq)]
pub enum ModalState {
    DeleteConfirm { target: Target, selected: usize },
    SuspendConfirm { target: Target, action: BlockAction, selected: usize },
    ContentDetail { id: String },
    /// Blocking notice that must be dismissed.
    Alert { title: String, message: String },
    Help { scroll: u16 },
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub accent: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub danger: Color,
}

impl Theme {
    /// Plain ANSI palette for terminals without truecolor.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Magenta,
            accent: Color::LightMagenta,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Magenta,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            success: Color::Green,
            danger: Color::Red,
        }
    }

    /// Brand palette: violet chrome on a near-black background.
    pub fn blumdate() -> Self {
        Self {
            text: Color::Rgb(0xe4, 0xe1, 0xf0),
            muted: Color::Rgb(0x8a, 0x84, 0xa3),
            title: Color::Rgb(0xb3, 0x8b, 0xfa),
            accent: Color::Rgb(0x7c, 0x3a, 0xed),
            border: Color::Rgb(0x4c, 0x45, 0x69),
            header_bg: Color::Rgb(0x2a, 0x23, 0x40),
            header_fg: Color::Rgb(0xd8, 0xc8, 0xff),
            status_bg: Color::Rgb(0x3b, 0x32, 0x5c),
            status_fg: Color::Rgb(0xe4, 0xe1, 0xf0),
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf),
            highlight_bg: Color::Rgb(0x3b, 0x32, 0x5c),
            success: Color::Rgb(0x86, 0xef, 0xac),
            danger: Color::Rgb(0xf8, 0x71, 0x71),
        }
    }

    /// Load a key=value theme. Unknown or missing keys keep the `blumdate` colors.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut theme = Self::blumdate();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let Some(color) = Self::parse_color(val) else { continue };
            if let Some(slot) = theme.slot(key.trim()) {
                *slot = color;
            }
        }
        theme
    }

    /// "#RRGGBB", "RRGGBB", "reset" or a named ANSI color such as "DarkGray".
    fn parse_color(s: &str) -> Option<Color> {
        let raw = s.trim();
        let hex = raw.strip_prefix('#').unwrap_or(raw);
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        raw.parse::<Color>().ok()
    }

    fn slot(&mut self, key: &str) -> Option<&mut Color> {
        Some(match key {
            "text" => &mut self.text,
            "muted" => &mut self.muted,
            "title" => &mut self.title,
            "accent" => &mut self.accent,
            "border" => &mut self.border,
            "header_bg" => &mut self.header_bg,
            "header_fg" => &mut self.header_fg,
            "status_bg" => &mut self.status_bg,
            "status_fg" => &mut self.status_fg,
            "highlight_fg" => &mut self.highlight_fg,
            "highlight_bg" => &mut self.highlight_bg,
            "success" => &mut self.success,
            "danger" => &mut self.danger,
            _ => return None,
        })
    }

    fn entries(&self) -> [(&'static str, Color); 13] {
        [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("accent", self.accent),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("success", self.success),
            ("danger", self.danger),
        ]
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        let mut out = String::from(
            "# blumdate-admin theme\n# Values: #RRGGBB, reset, or an ANSI color name\n\n",
        );
        for (key, color) in self.entries() {
            let value = match color {
                Color::Rgb(r, g, b) => format!("#{r:02X}{g:02X}{b:02X}"),
                other => other.to_string(),
            };
            out.push_str(&format!("{key} = {value}\n"));
        }
        std::fs::write(path, out)
    }

    /// Palette written on first run: the brand colors when the terminal
    /// advertises truecolor, plain ANSI otherwise.
    pub fn for_terminal() -> Self {
        match std::env::var("COLORTERM").as_deref() {
            Ok("truecolor") | Ok("24bit") => Self::blumdate(),
            _ => Self::dark(),
        }
    }

    /// Load `path`, creating it from [`Theme::for_terminal`] when missing.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::blumdate);
        }
        let t = Self::for_terminal();
        if let Err(e) = t.write_file(path) {
            tracing::warn!(%path, error = %e, "could not write default theme");
        }
        t
    }
}

/// Totals and chart fed by the same `/admin/profiles` fetch as the profiles list.
#[derive(Clone, Debug)]
pub struct DashboardState {
    pub state: LoadState,
    pub totals: Totals,
    pub chart: Vec<MonthBucket>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            state: LoadState::Loading,
            totals: Totals::default(),
            chart: dashboard::empty_chart(),
        }
    }
}

impl DashboardState {
    pub fn finish_load(&mut self, result: Result<Vec<UserRecord>, AdminError>) {
        match result {
            Ok(users) => {
                self.totals = dashboard::totals(&users);
                self.chart = dashboard::premium_chart(&users);
                self.state = LoadState::Ready;
            }
            Err(err) => {
                self.totals = Totals::default();
                self.chart = dashboard::empty_chart();
                self.state = LoadState::Failed(err);
            }
        }
    }
}

/// The single-profile card.
#[derive(Clone, Debug)]
pub struct ProfileDetail {
    pub id: String,
    pub state: LoadState,
    pub record: Option<UserRecord>,
    /// List the card was opened from.
    pub return_to: Screen,
}

pub struct AppState {
    pub started_at: Instant,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub modal: Option<ModalState>,
    pub session: Session,
    pub theme: Theme,
    pub keymap: Keymap,
    pub profiles: ListController<UserRecord>,
    pub suspended: ListController<UserRecord>,
    pub verification: ListController<VerificationRequest>,
    pub reports: ListController<ReportRecord>,
    pub moderation: ListController<ContentRecord>,
    pub dashboard: DashboardState,
    pub detail: Option<ProfileDetail>,
    pub auth: AuthFlow,
    /// Digits typed at the page-jump prompt.
    pub page_input: String,
    /// One-line feedback under the table (mutation results, hints).
    pub status: Option<String>,
    /// Screens whose initial fetch has been issued.
    pub mounted: HashSet<Screen>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(session: Session, theme: Theme, keymap: Keymap, page_size: usize, debounce: std::time::Duration) -> Self {
        Self {
            started_at: Instant::now(),
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            modal: None,
            session,
            theme,
            keymap,
            profiles: ListController::new(page_size, debounce, "No users found."),
            suspended: ListController::new(page_size, debounce, "No suspended users found."),
            verification: ListController::new(
                page_size,
                debounce,
                "No verification requests available at this time.",
            ),
            reports: ListController::new(page_size, debounce, "No reports at the moment."),
            moderation: ListController::new(page_size, debounce, "No user content available at the moment."),
            dashboard: DashboardState::default(),
            detail: None,
            auth: AuthFlow::new(AuthMode::Login),
            page_input: String::new(),
            status: None,
            mounted: HashSet::new(),
            should_quit: false,
        }
    }

    /// State built from command-line arguments; theme and keymap files are
    /// created on first run.
    pub fn from_args(args: &Args) -> Self {
        let mut app = Self::new(
            args.session(),
            Theme::load_or_init(&args.theme),
            Keymap::load_or_init(&args.keybinds),
            args.page_size,
            args.debounce(),
        );
        app.screen = args.screen.into();
        if app.screen == Screen::Login {
            app.input_mode = InputMode::Login;
        }
        app
    }

    pub fn open_modal(&mut self, modal: ModalState) {
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = if self.screen == Screen::Login { InputMode::Login } else { InputMode::Normal };
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
