//! Command-line and environment configuration.
use std::time::Duration;

use clap::builder::TypedValueParser;
use clap::{Parser, ValueEnum};

use crate::pager::DEFAULT_PAGE_SIZE;
use crate::session::Session;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StartScreen {
    /// Email + one-time-code sign-in before anything else.
    Login,
    Dashboard,
    Profiles,
    Suspended,
    Verification,
    Reports,
    Moderation,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "blumdate-admin",
    version,
    about = "Terminal admin dashboard for the Blumdate backend",
    long_about = "Browse, search and moderate Blumdate users, reports and content from the terminal.\n\nExamples:\n  BLUMDATE_API_TOKEN=... blumdate-admin\n  blumdate-admin --screen login\n  blumdate-admin --api-url http://localhost:5000/api/v1 --page-size 20"
)]
pub struct Args {
    #[arg(
        long,
        env = "BLUMDATE_API_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN",
        help_heading = "Backend",
        help = "Bearer token sent with every admin request."
    )]
    pub token: Option<String>,

    #[arg(
        long,
        env = "BLUMDATE_API_URL",
        value_name = "URL",
        help_heading = "Backend",
        help = "Base URL of the REST API (default https://api.blumdate.com/api/v1)."
    )]
    pub api_url: Option<String>,

    #[arg(
        long,
        value_enum,
        default_value = "dashboard",
        help_heading = "Interface",
        help = "Screen shown at startup."
    )]
    pub screen: StartScreen,

    #[arg(
        long,
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u16).range(1..=500).map(usize::from),
        help_heading = "Interface",
        help = "Rows per page on list screens."
    )]
    pub page_size: usize,

    #[arg(
        long,
        default_value_t = 300,
        value_name = "MS",
        help_heading = "Interface",
        help = "Quiet period after the last keystroke before a search runs."
    )]
    pub debounce_ms: u64,

    #[arg(
        long,
        default_value = "theme.conf",
        value_name = "FILE",
        help_heading = "Interface",
        help = "Theme file (key = #RRGGBB); created with defaults if missing."
    )]
    pub theme: String,

    #[arg(
        long,
        default_value = "keybinds.conf",
        value_name = "FILE",
        help_heading = "Interface",
        help = "Keybindings file; created with defaults if missing."
    )]
    pub keybinds: String,

    #[arg(
        long,
        default_value = "blumdate-admin.log",
        value_name = "FILE",
        help_heading = "Output",
        help = "Log file. Level is controlled by RUST_LOG (default info)."
    )]
    pub log_file: String,
}

impl Args {
    pub fn session(&self) -> Session {
        Session::new(self.api_url.clone(), self.token.clone())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_list_behavior() {
        let args = Args::try_parse_from(["blumdate-admin", "--token", "t"]).unwrap();
        assert_eq!(args.page_size, 10);
        assert_eq!(args.debounce(), Duration::from_millis(300));
        assert_eq!(args.screen, StartScreen::Dashboard);
        assert!(args.session().has_token());
    }

    #[test]
    fn screen_and_page_size_flags() {
        let args =
            Args::try_parse_from(["blumdate-admin", "--screen", "login", "--page-size", "25"]).unwrap();
        assert_eq!(args.screen, StartScreen::Login);
        assert_eq!(args.page_size, 25);
        assert!(Args::try_parse_from(["blumdate-admin", "--page-size", "0"]).is_err());
    }
}
