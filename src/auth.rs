//! Email + one-time-code sign-in.
//!
//! [`AuthFlow`] is a pure state machine: the event loop performs the network
//! calls and feeds their results back through the `on_*` methods, which
//! return an [`AuthOutcome`] describing what the UI should do next.
use tracing::{info, warn};

use crate::api::AuthReply;
use crate::error::AdminError;

pub const OTP_LEN: usize = 6;
pub const ADMIN_ROLES: [&str; 2] = ["admin", "super-admin"];

pub const EMPTY_CODE: &str = "Please provide a valid OTP code";
pub const INCOMPLETE_CODE: &str = "Please enter all 6 digits";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const RESENT: &str = "Verification code resent successfully";
pub const RESTRICTED: &str = "Restricted access: Only admins or super-admins can log in.";

/// Message fragments the backend uses when it has emailed a code.
const LOGIN_CODE_SENT: &str = "Verification code sent";
const REGISTER_CODE_SENT: &str = "verification code has been sent";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Welcome back, Admin",
            Self::Register => "Create an admin account",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }

    fn code_sent_marker(self) -> &'static str {
        match self {
            Self::Login => LOGIN_CODE_SENT,
            Self::Register => REGISTER_CODE_SENT,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuthStage {
    AwaitingCredentials,
    AwaitingCode,
}

/// Six-slot numeric code entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OtpInput {
    digits: String,
}

impl OtpInput {
    /// Accepts ASCII digits only, up to [`OTP_LEN`]. Returns whether the
    /// character was taken.
    pub fn push(&mut self, c: char) -> bool {
        if c.is_ascii_digit() && self.digits.len() < OTP_LEN {
            self.digits.push(c);
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) {
        self.digits.pop();
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.digits.len() == OTP_LEN
    }

    /// Per-slot view for rendering; unfilled slots are `None`.
    pub fn slots(&self) -> [Option<char>; OTP_LEN] {
        let mut out = [None; OTP_LEN];
        for (slot, c) in out.iter_mut().zip(self.digits.chars()) {
            *slot = Some(c);
        }
        out
    }
}

/// What the UI should do after an auth step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Show the code entry popup.
    CodeRequested,
    /// Signed in as an admin; `token` is whatever the server returned.
    Authenticated { token: Option<String> },
    /// Signed in but not an admin. The UI shows a blocking alert.
    Restricted,
    /// Inline message on the form (errors and the resend notice).
    Message(String),
    /// Server accepted the call but there is nothing to act on.
    Idle,
}

#[derive(Clone, Debug)]
pub struct AuthFlow {
    pub mode: AuthMode,
    pub email: String,
    pub otp: OtpInput,
    stage: AuthStage,
    message: Option<String>,
    busy: bool,
}

impl AuthFlow {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            email: String::new(),
            otp: OtpInput::default(),
            stage: AuthStage::AwaitingCredentials,
            message: None,
            busy: false,
        }
    }

    pub fn stage(&self) -> AuthStage {
        self.stage
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn toggle_mode(&mut self) {
        if self.stage == AuthStage::AwaitingCredentials && !self.busy {
            self.mode = self.mode.toggled();
            self.message = None;
        }
    }

    /// Validate the email and mark a login/register call as pending. Returns
    /// the address to send, or `None` if the form is not ready.
    pub fn submit_email(&mut self) -> Option<String> {
        if self.busy || self.stage != AuthStage::AwaitingCredentials {
            return None;
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            self.message = Some(INVALID_EMAIL.to_string());
            return None;
        }
        self.message = None;
        self.busy = true;
        Some(email.to_string())
    }

    /// Result of `POST /auth/login` or `/auth/register`.
    pub fn on_credentials_reply(&mut self, reply: Result<AuthReply, AdminError>) -> AuthOutcome {
        self.busy = false;
        match reply {
            Ok(reply) if reply.says(self.mode.code_sent_marker()) => {
                info!(email = %self.email.trim(), "verification code sent");
                self.stage = AuthStage::AwaitingCode;
                self.otp.clear();
                AuthOutcome::CodeRequested
            }
            // A login that skipped the code step returns the session directly.
            Ok(reply) if self.mode == AuthMode::Login => self.check_role(reply),
            Ok(_) => AuthOutcome::Idle,
            Err(err) => self.fail(err),
        }
    }

    /// Validate the code and mark a verify call as pending. On an empty code
    /// the popup is closed with an inline message and nothing is sent.
    pub fn submit_code(&mut self) -> Option<(String, String)> {
        if self.busy || self.stage != AuthStage::AwaitingCode {
            return None;
        }
        if self.otp.is_empty() {
            self.message = Some(EMPTY_CODE.to_string());
            self.stage = AuthStage::AwaitingCredentials;
            return None;
        }
        if !self.otp.is_complete() {
            self.message = Some(INCOMPLETE_CODE.to_string());
            return None;
        }
        self.busy = true;
        Some((self.email.trim().to_string(), self.otp.as_str().to_string()))
    }

    /// Result of `POST /auth/verifyEmailOrPhone`. The popup closes whatever
    /// the outcome.
    pub fn on_verify_reply(&mut self, reply: Result<AuthReply, AdminError>) -> AuthOutcome {
        self.busy = false;
        self.stage = AuthStage::AwaitingCredentials;
        self.otp.clear();
        match reply {
            Ok(reply) => self.check_role(reply),
            Err(err) => self.fail(err),
        }
    }

    /// Email for a resend, if the code popup is open.
    pub fn request_resend(&self) -> Option<String> {
        (self.stage == AuthStage::AwaitingCode && !self.busy).then(|| self.email.trim().to_string())
    }

    /// Result of `POST /auth/login/resendOtp`. Never changes the stage.
    pub fn on_resend_reply(&mut self, reply: Result<AuthReply, AdminError>) -> AuthOutcome {
        match reply {
            Ok(_) => {
                self.message = Some(RESENT.to_string());
                AuthOutcome::Message(RESENT.to_string())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Close the popup without verifying.
    pub fn cancel_code(&mut self) {
        if !self.busy {
            self.stage = AuthStage::AwaitingCredentials;
            self.otp.clear();
        }
    }

    fn check_role(&mut self, reply: AuthReply) -> AuthOutcome {
        if is_admin_role(reply.role.as_deref()) {
            info!(role = ?reply.role, "admin signed in");
            self.message = None;
            AuthOutcome::Authenticated { token: reply.token }
        } else {
            warn!(role = ?reply.role, "sign-in refused for non-admin role");
            AuthOutcome::Restricted
        }
    }

    fn fail(&mut self, err: AdminError) -> AuthOutcome {
        let msg = err.user_message();
        warn!(error = %msg, "auth step failed");
        self.message = Some(msg.clone());
        AuthOutcome::Message(msg)
    }
}

pub fn is_admin_role(role: Option<&str>) -> bool {
    role.is_some_and(|r| ADMIN_ROLES.contains(&r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(message: &str, role: Option<&str>) -> AuthReply {
        AuthReply {
            message: Some(message.to_string()),
            token: Some("jwt".into()),
            role: role.map(str::to_string),
        }
    }

    fn at_code_stage() -> AuthFlow {
        let mut flow = AuthFlow::new(AuthMode::Login);
        flow.email = "admin@blumdate.com".into();
        assert!(flow.submit_email().is_some());
        let out = flow.on_credentials_reply(Ok(reply("Verification code sent to your email", None)));
        assert_eq!(out, AuthOutcome::CodeRequested);
        flow
    }

    #[test]
    fn otp_accepts_six_digits_only() {
        let mut otp = OtpInput::default();
        assert!(!otp.push('a'));
        for c in "1234567".chars() {
            otp.push(c);
        }
        assert_eq!(otp.as_str(), "123456");
        assert!(otp.is_complete());
        assert_eq!(otp.slots()[5], Some('6'));
    }

    #[test]
    fn admin_code_verification_authenticates() {
        let mut flow = at_code_stage();
        "424242".chars().for_each(|c| {
            flow.otp.push(c);
        });
        let (email, code) = flow.submit_code().unwrap();
        assert_eq!((email.as_str(), code.as_str()), ("admin@blumdate.com", "424242"));
        let out = flow.on_verify_reply(Ok(reply("ok", Some("admin"))));
        assert_eq!(out, AuthOutcome::Authenticated { token: Some("jwt".into()) });
    }

    #[test]
    fn non_admin_is_restricted_and_popup_closes() {
        let mut flow = at_code_stage();
        "111111".chars().for_each(|c| {
            flow.otp.push(c);
        });
        flow.submit_code().unwrap();
        let out = flow.on_verify_reply(Ok(reply("ok", Some("user"))));
        assert_eq!(out, AuthOutcome::Restricted);
        assert_eq!(flow.stage(), AuthStage::AwaitingCredentials);
    }

    #[test]
    fn empty_code_is_rejected_locally() {
        let mut flow = at_code_stage();
        assert!(flow.submit_code().is_none());
        assert_eq!(flow.message(), Some(EMPTY_CODE));
        assert_eq!(flow.stage(), AuthStage::AwaitingCredentials);
    }

    #[test]
    fn resend_keeps_code_stage() {
        let mut flow = at_code_stage();
        assert!(flow.request_resend().is_some());
        flow.on_resend_reply(Ok(AuthReply::default()));
        assert_eq!(flow.stage(), AuthStage::AwaitingCode);
        assert_eq!(flow.message(), Some(RESENT));
    }

    #[test]
    fn direct_login_goes_through_role_check() {
        let mut flow = AuthFlow::new(AuthMode::Login);
        flow.email = "boss@blumdate.com".into();
        flow.submit_email();
        let out = flow.on_credentials_reply(Ok(reply("Logged in", Some("super-admin"))));
        assert!(matches!(out, AuthOutcome::Authenticated { .. }));
    }

    #[test]
    fn register_waits_for_its_own_marker() {
        let mut flow = AuthFlow::new(AuthMode::Register);
        flow.email = "new@blumdate.com".into();
        flow.submit_email();
        let out = flow.on_credentials_reply(Ok(reply(
            "A verification code has been sent to your email",
            None,
        )));
        assert_eq!(out, AuthOutcome::CodeRequested);
    }

    #[test]
    fn server_error_message_is_shown() {
        let mut flow = AuthFlow::new(AuthMode::Login);
        flow.email = "x@y.z".into();
        flow.submit_email();
        let out = flow.on_credentials_reply(Err(AdminError::application(
            Some("User not found".into()),
            "Something went wrong",
        )));
        assert_eq!(out, AuthOutcome::Message("User not found".into()));
        assert!(!flow.is_busy());
    }
}
