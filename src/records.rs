//! Normalized records shown on the admin screens.
//!
//! Wire payloads are mapped into these types by `api::models`; everything
//! downstream (search, pager, UI) only sees these.
use std::borrow::Cow;

use chrono::{DateTime, Utc};

pub const PLACEHOLDER_AVATAR: &str =
    "https://i.pinimg.com/736x/b5/f2/3c/b5f23cc57e500a2a7d79f903aeff550a.jpg";
pub const MEDIA_HOST: &str = "https://api.blumdate.com";
pub const PREMIUM_PRICE: &str = "$9.99/month";
pub const NOT_AVAILABLE: &str = "N/A";

/// A row held by a list screen. Identity is `id`; the search predicate looks
/// at `search_fields`.
pub trait Record: Clone {
    fn id(&self) -> &str;
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

/// `Month D, YYYY`, or `N/A` when the server sent no timestamp.
pub fn format_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Local part of an email address (`jane` for `jane@example.com`).
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn from_blocked(is_blocked: bool) -> Self {
        if is_blocked { Self::Suspended } else { Self::Active }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
        }
    }

    /// The block/unblock action that flips this status.
    pub fn flip_action(self) -> BlockAction {
        match self {
            Self::Active => BlockAction::Block,
            Self::Suspended => BlockAction::Unblock,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockAction {
    Block,
    Unblock,
}

impl BlockAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Unblock => "unblock",
        }
    }

    /// Button/dialog verb.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Block => "Suspend",
            Self::Unblock => "Unblock",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccountType {
    Free,
    Premium,
}

impl AccountType {
    pub fn from_premium(premium: bool) -> Self {
        if premium { Self::Premium } else { Self::Free }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Premium => "Premium",
        }
    }
}

/// Subscription block derived from the premium flag and account timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct Subscription {
    pub premium: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub renewed_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn status(&self) -> &'static str {
        if self.premium { "Active" } else { "Inactive" }
    }

    pub fn plan(&self) -> &'static str {
        AccountType::from_premium(self.premium).label()
    }

    pub fn start_date(&self) -> String {
        format_date(self.started_at)
    }

    pub fn end_date(&self) -> String {
        if self.premium {
            format_date(self.renewed_at)
        } else {
            NOT_AVAILABLE.to_string()
        }
    }

    pub fn renewal(&self) -> &'static str {
        if self.premium { "Auto-Renew Enabled" } else { NOT_AVAILABLE }
    }

    pub fn price(&self) -> &'static str {
        if self.premium { PREMIUM_PRICE } else { NOT_AVAILABLE }
    }
}

/// An account as shown on the profiles, suspended and detail screens.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub account_type: AccountType,
    pub status: AccountStatus,
    pub joined_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Latitude, longitude.
    pub location: Option<(f64, f64)>,
    pub avatar: String,
    pub images: Vec<String>,
    pub subscription: Subscription,
}

impl UserRecord {
    pub fn username(&self) -> &str {
        email_local_part(&self.email)
    }

    pub fn join_date(&self) -> String {
        format_date(self.joined_at)
    }

    pub fn last_login(&self) -> String {
        self.last_login_at
            .or(self.joined_at)
            .map(|d| d.format("%B %-d, %Y, %H:%M").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn location_label(&self) -> String {
        match self.location {
            Some((lat, lng)) => format!("{lat}, {lng}"),
            None => "Unknown".to_string(),
        }
    }
}

impl Record for UserRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.name), Cow::Borrowed(&self.email)]
    }
}

/// An abuse report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRecord {
    pub id: String,
    pub reporter_email: Option<String>,
    pub reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ReportRecord {
    pub fn reporter(&self) -> &str {
        self.reporter_email.as_deref().unwrap_or("Unknown")
    }

    pub fn reason_label(&self) -> &str {
        self.reason.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn date(&self) -> String {
        format_date(self.created_at)
    }
}

impl Record for ReportRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.reporter_email.as_deref().unwrap_or("")),
            Cow::Borrowed(self.reason.as_deref().unwrap_or("")),
        ]
    }
}

/// A user's public content, reviewed on the moderation screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub photo: String,
    pub favorite_colors: Vec<String>,
    pub role: String,
    pub distance_km: Option<f64>,
    pub phone: Option<String>,
    pub referral_code: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub facial_verified: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name.as_deref().unwrap_or(""))
            .trim_end()
            .to_string()
    }

    pub fn has_external_media(&self) -> bool {
        self.photo.starts_with("http")
    }

    /// Absolute photo URL; relative paths live on the media host.
    pub fn photo_url(&self) -> String {
        if self.has_external_media() {
            self.photo.clone()
        } else {
            format!("{MEDIA_HOST}/{}", self.photo.trim_start_matches('/'))
        }
    }

    pub fn media_label(&self) -> &'static str {
        if self.has_external_media() { "External Media" } else { "Default Media" }
    }

    pub fn colors_label(&self) -> String {
        if self.favorite_colors.is_empty() {
            "None".to_string()
        } else {
            self.favorite_colors.join(", ")
        }
    }

    pub fn joined(&self) -> String {
        format_date(self.created_at)
    }
}

impl Record for ContentRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.first_name),
            Cow::Borrowed(&self.email),
            Cow::Owned(self.favorite_colors.join(" ")),
        ]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    Pending,
    Approved,
}

impl VerificationStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
        }
    }
}

/// An identity verification request awaiting review.
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: VerificationStatus,
    pub requested_at: Option<DateTime<Utc>>,
}

impl Record for VerificationRequest {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.name), Cow::Borrowed(&self.email)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_flip_maps_to_inverse_action() {
        assert_eq!(AccountStatus::Active.flip_action(), BlockAction::Block);
        assert_eq!(AccountStatus::Suspended.flip_action(), BlockAction::Unblock);
        assert_eq!(BlockAction::Unblock.as_str(), "unblock");
    }

    #[test]
    fn subscription_fields_follow_premium_flag() {
        let start = Utc.with_ymd_and_hms(2024, 7, 4, 10, 0, 0).unwrap();
        let renew = Utc.with_ymd_and_hms(2024, 8, 4, 10, 0, 0).unwrap();
        let premium = Subscription { premium: true, started_at: Some(start), renewed_at: Some(renew) };
        assert_eq!(premium.status(), "Active");
        assert_eq!(premium.start_date(), "July 4, 2024");
        assert_eq!(premium.end_date(), "August 4, 2024");
        assert_eq!(premium.price(), PREMIUM_PRICE);

        let free = Subscription { premium: false, ..premium };
        assert_eq!(free.plan(), "Free");
        assert_eq!(free.end_date(), NOT_AVAILABLE);
        assert_eq!(free.renewal(), NOT_AVAILABLE);
    }

    #[test]
    fn content_search_fields_join_colors() {
        let c = ContentRecord {
            id: "c1".into(),
            first_name: "Ada".into(),
            last_name: None,
            email: "ada@example.com".into(),
            photo: "uploads/ada.png".into(),
            favorite_colors: vec!["Teal".into(), "Crimson".into()],
            role: "user".into(),
            distance_km: None,
            phone: None,
            referral_code: None,
            email_verified: true,
            phone_verified: false,
            facial_verified: false,
            created_at: None,
        };
        assert_eq!(c.search_fields()[2], "Teal Crimson");
        assert_eq!(c.full_name(), "Ada");
        assert_eq!(c.photo_url(), "https://api.blumdate.com/uploads/ada.png");
        assert_eq!(c.media_label(), "Default Media");
    }
}
