//! Bearer credential and backend location shared by every request.

use crate::error::AdminError;

pub const DEFAULT_BASE_URL: &str = "https://api.blumdate.com/api/v1";

/// Process-wide credential. Built once at startup and handed to each
/// request-issuing component; never refreshed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    token: Option<String>,
}

impl Session {
    /// Blank tokens count as missing. A trailing slash on the base URL is dropped.
    pub fn new(base_url: Option<String>, token: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Self { base_url, token }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, or a configuration error when none was provided.
    pub fn bearer(&self) -> Result<&str, AdminError> {
        self.token.as_deref().ok_or(AdminError::Configuration)
    }

    /// Absolute URL for an endpoint path such as `/admin/profiles`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Session established by a successful login. Only applies when no token
    /// was configured; an existing token is kept.
    pub fn established_by_login(&self, token: &str) -> Self {
        if self.has_token() {
            return self.clone();
        }
        Self::new(Some(self.base_url.clone()), Some(token.to_string()))
    }
}
