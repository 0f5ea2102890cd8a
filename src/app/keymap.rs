//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Bindings are a map from `(KeyModifiers, KeyCode)` to a semantic [`KeyAction`].
//! A missing config file is created from the defaults so users have something
//! to edit.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic keyboard actions for list screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Show the keybindings reference.
    OpenHelp,
    /// Focus the search prompt.
    StartSearch,
    /// Fetch the current screen again.
    Reload,
    /// Cycle to the next screen in the sidebar.
    NextScreen,
    /// Cycle to the previous screen.
    PrevScreen,
    /// Open the selected row (profile card, content detail).
    OpenSelection,
    /// Ask to delete the selected profile.
    DeleteSelection,
    /// Ask to suspend or unblock the selected account.
    ToggleSuspend,
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    /// Prompt for a page number.
    JumpToPage,
    /// Leave a detail view.
    Back,
    Ignore,
}

#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Arrow keys plus vim-style `hjkl`, letters for the row actions.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('r')), KeyAction::Reload);
        bindings.insert((M::NONE, Tab), KeyAction::NextScreen);
        // Some terminals report Shift+Tab as BackTab with SHIFT set.
        bindings.insert((M::NONE, BackTab), KeyAction::PrevScreen);
        bindings.insert((M::SHIFT, BackTab), KeyAction::PrevScreen);
        bindings.insert((M::NONE, Enter), KeyAction::OpenSelection);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Char('s')), KeyAction::ToggleSuspend);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::PrevPage);
        bindings.insert((M::NONE, Right), KeyAction::NextPage);
        bindings.insert((M::NONE, Char('h')), KeyAction::PrevPage);
        bindings.insert((M::NONE, Char('l')), KeyAction::NextPage);
        bindings.insert((M::NONE, PageUp), KeyAction::PrevPage);
        bindings.insert((M::NONE, PageDown), KeyAction::NextPage);
        bindings.insert((M::NONE, Home), KeyAction::FirstPage);
        bindings.insert((M::NONE, End), KeyAction::LastPage);
        bindings.insert((M::NONE, Char('g')), KeyAction::JumpToPage);
        bindings.insert((M::NONE, Esc), KeyAction::Back);
        Self { bindings }
    }

    /// Load from `path`, or write the defaults there if it does not exist.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(e) = km.write_file(path) {
            tracing::warn!(%path, error = %e, "could not write default keybinds");
        }
        km
    }

    /// Parse `<Action> = <KeySpec>` lines on top of the defaults. The legacy
    /// `<KeySpec> = <Action>` order is accepted as well.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else { continue };
            let (lhs, rhs) = (lhs.trim(), rhs.trim());
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
            } else if let (Some(key), Some(action)) = (parse_key(lhs), parse_action(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        map
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# blumdate-admin keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+c, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, PageUp, PageDown, Home, End, Delete, /\n\n");

        let mut rows: Vec<(String, KeyAction)> = self
            .bindings
            .iter()
            .map(|((m, c), a)| (Self::format_key(*m, *c), *a))
            .collect();
        rows.sort_by(|a, b| format_action(a.1).cmp(format_action(b.1)).then(a.0.cmp(&b.0)));
        for (key, action) in rows {
            let _ = writeln!(&mut buf, "{} = {}", format_action(action), key);
        }
        std::fs::write(path, buf)
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Keys bound to `action`, formatted and sorted, for the help modal and status bar.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((m, c), _)| Self::format_key(*m, *c))
            .collect();
        keys.sort();
        keys
    }

    /// "Ctrl+c", "BackTab", "q".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        let base = match code {
            KeyCode::Char(c) => c.to_string(),
            other => NAMED_KEYS
                .iter()
                .find(|(_, k)| *k == other)
                .map(|(name, _)| name.to_string())
                .unwrap_or_else(|| format!("{other:?}")),
        };
        if mods.contains(KeyModifiers::CONTROL) { format!("Ctrl+{base}") } else { base }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

/// Key names accepted in the config file; `Escape` is read as an alias of `Esc`.
const NAMED_KEYS: [(&str, KeyCode); 13] = [
    ("Enter", KeyCode::Enter),
    ("Delete", KeyCode::Delete),
    ("Esc", KeyCode::Esc),
    ("Tab", KeyCode::Tab),
    ("BackTab", KeyCode::BackTab),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
];

/// Config name and help text of each action.
const ACTIONS: [(KeyAction, &str, &str); 18] = [
    (KeyAction::Quit, "Quit", "Quit"),
    (KeyAction::OpenHelp, "OpenHelp", "Show this help"),
    (KeyAction::StartSearch, "StartSearch", "Search the current list"),
    (KeyAction::Reload, "Reload", "Reload the current screen"),
    (KeyAction::NextScreen, "NextScreen", "Next screen"),
    (KeyAction::PrevScreen, "PrevScreen", "Previous screen"),
    (KeyAction::OpenSelection, "OpenSelection", "Open the selected row"),
    (KeyAction::DeleteSelection, "DeleteSelection", "Delete the selected profile"),
    (KeyAction::ToggleSuspend, "ToggleSuspend", "Suspend / unblock the selected account"),
    (KeyAction::MoveUp, "MoveUp", "Move up"),
    (KeyAction::MoveDown, "MoveDown", "Move down"),
    (KeyAction::PrevPage, "PrevPage", "Previous page"),
    (KeyAction::NextPage, "NextPage", "Next page"),
    (KeyAction::FirstPage, "FirstPage", "First page"),
    (KeyAction::LastPage, "LastPage", "Last page"),
    (KeyAction::JumpToPage, "JumpToPage", "Jump to page"),
    (KeyAction::Back, "Back", "Back / close"),
    (KeyAction::Ignore, "Ignore", ""),
];

/// `q`, `Ctrl+c`, `PageDown`, `/`.
fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    let s = spec.trim();
    let (mods, rest) = s
        .strip_prefix("Ctrl+")
        .map_or((KeyModifiers::NONE, s), |after| (KeyModifiers::CONTROL, after));
    let rest = if rest == "Escape" { "Esc" } else { rest };
    if let Some((_, code)) = NAMED_KEYS.iter().find(|(name, _)| *name == rest) {
        return Some((mods, *code));
    }
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some((mods, KeyCode::Char(c))),
        _ => None,
    }
}

fn parse_action(s: &str) -> Option<KeyAction> {
    let name = s.trim();
    ACTIONS.iter().find(|(_, n, _)| *n == name).map(|(a, _, _)| *a)
}

fn action_entry(a: KeyAction) -> (&'static str, &'static str) {
    ACTIONS
        .iter()
        .find(|(action, _, _)| *action == a)
        .map_or(("Ignore", ""), |(_, name, help)| (*name, *help))
}

pub fn format_action(a: KeyAction) -> &'static str {
    action_entry(a).0
}

/// One-line description for the help modal.
pub fn describe_action(a: KeyAction) -> &'static str {
    action_entry(a).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_specs_round_trip_through_format() {
        for spec in ["q", "Ctrl+c", "PageDown", "BackTab", "/", "Esc"] {
            let (mods, code) = parse_key(spec).unwrap();
            assert_eq!(Keymap::format_key(mods, code), spec);
        }
        assert_eq!(parse_key("Escape"), Some((KeyModifiers::NONE, KeyCode::Esc)));
        assert_eq!(parse_key("Ctrl+"), None);
        assert_eq!(parse_key("qq"), None);
    }

    #[test]
    fn legacy_key_first_order_is_accepted() {
        let km = Keymap::parse("x = Reload\nbogus line\n");
        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(km.resolve(&x), Some(KeyAction::Reload));
        assert_eq!(format_action(KeyAction::ToggleSuspend), "ToggleSuspend");
        assert_eq!(parse_action("JumpToPage"), Some(KeyAction::JumpToPage));
    }
}
