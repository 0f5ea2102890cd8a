//! Authenticated client for the Blumdate REST backend.
//!
//! Each list screen does a single GET through [`ApiClient`]; mutations and
//! the OTP login calls go through the same client. Every call classifies its
//! failure into an [`AdminError`] so screens only decide how to present it.
pub mod models;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AdminError;
use crate::records::{BlockAction, ContentRecord, ReportRecord, UserRecord};
use crate::session::Session;
use models::{
    AuthData, BlockRequest, EmailRequest, Envelope, ProfilesData, RegisterRequest, UsersData,
    VerifyRequest, Rows, WireProfile, WireReport, WireUser,
};

const USER_AGENT: &str = concat!("blumdate-admin/", env!("CARGO_PKG_VERSION"));

/// A collection endpoint and the wording its screen uses for failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    /// Noun used in "Failed to fetch {resource}."
    pub resource: &'static str,
    /// Shown when the envelope reports failure without a message.
    pub fallback: &'static str,
}

pub const PROFILES: Endpoint = Endpoint {
    path: "/admin/profiles",
    resource: "users",
    fallback: "Failed to load users.",
};
pub const BLOCKED_USERS: Endpoint = Endpoint {
    path: "/admin/users/blocked",
    resource: "suspended users",
    fallback: "Failed to load suspended users.",
};
pub const REPORTS: Endpoint = Endpoint {
    path: "/reports",
    resource: "reports",
    fallback: "Failed to fetch reports.",
};
pub const CONTENT: Endpoint = Endpoint {
    path: "/users",
    resource: "user content",
    fallback: "Failed to fetch user content.",
};

const PROFILE_NOT_FOUND: &str = "User not found or failed to load.";
const LOGIN_FALLBACK: &str = "Something went wrong";
const VERIFY_FALLBACK: &str = "Invalid OTP or server error";
const RESEND_FALLBACK: &str = "Failed to resend OTP";

/// Outcome of a login/register/verify call that the server accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthReply {
    pub message: Option<String>,
    pub token: Option<String>,
    pub role: Option<String>,
}

impl AuthReply {
    fn from_envelope(env: Envelope) -> Self {
        let role = env
            .data
            .and_then(|d| serde_json::from_value::<AuthData>(d).ok())
            .and_then(|d| d.user)
            .and_then(|u| u.role);
        Self { message: env.message, token: env.token, role }
    }

    pub fn says(&self, needle: &str) -> bool {
        self.message
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains(&needle.to_lowercase()))
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    pub fn new(session: Session) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    // ---- collections ----

    pub async fn fetch_profiles(&self) -> Result<Vec<UserRecord>, AdminError> {
        let data: ProfilesData = self.fetch_data(&PROFILES).await?;
        let users = models::normalize_profiles(data);
        info!(count = users.len(), "fetched profiles");
        Ok(users)
    }

    pub async fn fetch_blocked_users(&self) -> Result<Vec<UserRecord>, AdminError> {
        let data: Rows<WireUser> = self.fetch_data(&BLOCKED_USERS).await?;
        let users = models::normalize_blocked(data);
        info!(count = users.len(), "fetched suspended users");
        Ok(users)
    }

    pub async fn fetch_reports(&self) -> Result<Vec<ReportRecord>, AdminError> {
        let data: Rows<WireReport> = self.fetch_data(&REPORTS).await?;
        let reports = models::normalize_reports(data);
        info!(count = reports.len(), "fetched reports");
        Ok(reports)
    }

    pub async fn fetch_content(&self) -> Result<Vec<ContentRecord>, AdminError> {
        let data: UsersData = self.fetch_data(&CONTENT).await?;
        let content = models::normalize_content(data);
        info!(count = content.len(), "fetched user content");
        Ok(content)
    }

    /// `GET /admin/profile/{id}`: the detail card, also used to refresh a
    /// row after it was suspended or unblocked.
    pub async fn fetch_profile(&self, id: &str) -> Result<UserRecord, AdminError> {
        let endpoint = Endpoint {
            path: "/admin/profile",
            resource: "user data",
            fallback: PROFILE_NOT_FOUND,
        };
        let path = format!("/admin/profile/{id}");
        let env = self.authed(Method::GET, &path, &endpoint, None::<&()>).await?;
        if !env.is_success() {
            return Err(AdminError::application(env.message, PROFILE_NOT_FOUND));
        }
        let profile: WireProfile = decode(env.data, &endpoint)?;
        models::profile_record(&profile)
            .ok_or_else(|| AdminError::application(None, PROFILE_NOT_FOUND))
    }

    // ---- mutations ----

    pub async fn delete_profile(&self, id: &str) -> Result<(), AdminError> {
        let endpoint = Endpoint {
            path: "/admin/profile",
            resource: "user",
            fallback: "Failed to delete user.",
        };
        let path = format!("/admin/profile/{id}");
        let env = self.authed(Method::DELETE, &path, &endpoint, None::<&()>).await?;
        if !env.is_success() {
            warn!(%id, message = ?env.message, "delete rejected");
            return Err(AdminError::application(env.message, endpoint.fallback));
        }
        info!(%id, "deleted profile");
        Ok(())
    }

    pub async fn set_blocked(&self, id: &str, action: BlockAction) -> Result<(), AdminError> {
        let endpoint = Endpoint {
            path: "/admin/user/blockandunblock",
            resource: "user",
            fallback: "Failed to suspend/unblock user.",
        };
        let path = format!("/admin/user/blockandunblock/{id}");
        let body = BlockRequest { action: action.as_str() };
        let env = self.authed(Method::POST, &path, &endpoint, Some(&body)).await?;
        if !env.is_success() {
            warn!(%id, action = action.as_str(), message = ?env.message, "block/unblock rejected");
            return Err(AdminError::application(env.message, endpoint.fallback));
        }
        info!(%id, action = action.as_str(), "block/unblock applied");
        Ok(())
    }

    // ---- authentication ----

    pub async fn login(&self, email: &str) -> Result<AuthReply, AdminError> {
        self.public_post("/auth/login", &EmailRequest { email }, LOGIN_FALLBACK)
            .await
    }

    /// Registration needs a client-generated user id.
    pub async fn register(&self, email: &str) -> Result<AuthReply, AdminError> {
        let body = RegisterRequest { email, user_id: Uuid::new_v4().to_string() };
        self.public_post("/auth/register", &body, LOGIN_FALLBACK).await
    }

    pub async fn verify(&self, email: &str, otp: &str) -> Result<AuthReply, AdminError> {
        self.public_post("/auth/verifyEmailOrPhone", &VerifyRequest { email, otp }, VERIFY_FALLBACK)
            .await
    }

    pub async fn resend_code(&self, email: &str) -> Result<AuthReply, AdminError> {
        self.public_post("/auth/login/resendOtp", &EmailRequest { email }, RESEND_FALLBACK)
            .await
    }

    // ---- plumbing ----

    async fn fetch_data<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, AdminError> {
        let env = self.authed(Method::GET, endpoint.path, endpoint, None::<&()>).await?;
        if !env.is_success() {
            warn!(path = endpoint.path, status = ?env.status, "non-success envelope");
            return Err(AdminError::application(env.message, endpoint.fallback));
        }
        decode(env.data, endpoint)
    }

    /// Bearer-authenticated request. The token is checked before anything
    /// goes on the wire.
    async fn authed<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<Envelope, AdminError> {
        let token = self.session.bearer()?;
        let url = self.session.url(path);
        debug!(%method, %url, "request");
        let mut req = self.http.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(|e| {
            warn!(%url, error = %e, "request failed");
            AdminError::transport(endpoint.resource, e)
        })?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            warn!(%url, "endpoint returned 404");
            return Err(AdminError::NotFound {
                resource: endpoint.path.trim_start_matches('/').to_string(),
            });
        }
        if status != StatusCode::OK {
            warn!(%url, %status, "unexpected HTTP status");
            return Err(AdminError::transport(endpoint.resource, format!("HTTP {status}")));
        }
        resp.json::<Envelope>().await.map_err(|e| {
            warn!(%url, error = %e, "undecodable body");
            AdminError::transport(endpoint.resource, e)
        })
    }

    /// Unauthenticated auth call. Any failure becomes an application error
    /// carrying the server's message when one was sent.
    async fn public_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<AuthReply, AdminError> {
        let url = self.session.url(path);
        debug!(%url, "auth request");
        let resp = self.http.post(&url).json(body).send().await.map_err(|e| {
            warn!(%url, error = %e, "auth request failed");
            AdminError::application(None, fallback)
        })?;
        let status = resp.status();
        let env = resp.json::<Envelope>().await.unwrap_or_default();
        if !status.is_success() || !env.is_success() {
            warn!(%url, %status, message = ?env.message, "auth call rejected");
            return Err(AdminError::application(env.message, fallback));
        }
        info!(%url, "auth call accepted");
        Ok(AuthReply::from_envelope(env))
    }
}

fn decode<T: DeserializeOwned>(
    data: Option<serde_json::Value>,
    endpoint: &Endpoint,
) -> Result<T, AdminError> {
    let data = data.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(data).map_err(|e| {
        warn!(path = endpoint.path, error = %e, "payload shape mismatch");
        AdminError::transport(endpoint.resource, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        // Port 9 (discard) is never contacted: the error must come first.
        let client = ApiClient::new(Session::new(Some("http://127.0.0.1:9".into()), None));
        assert_eq!(client.fetch_reports().await, Err(AdminError::Configuration));
        assert_eq!(client.delete_profile("x").await, Err(AdminError::Configuration));
    }

    #[test]
    fn auth_reply_reads_role_and_token() {
        let env: Envelope = serde_json::from_value(serde_json::json!({
            "status": "success",
            "token": "jwt",
            "message": "Verification code sent to email",
            "data": {"user": {"role": "super-admin"}}
        }))
        .unwrap();
        let reply = AuthReply::from_envelope(env);
        assert_eq!(reply.token.as_deref(), Some("jwt"));
        assert_eq!(reply.role.as_deref(), Some("super-admin"));
        assert!(reply.says("verification code sent"));
    }
}
