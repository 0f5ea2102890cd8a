//! Wire shapes returned by the backend and their normalization into records.
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::records::{
    AccountStatus, AccountType, ContentRecord, PLACEHOLDER_AVATAR, ReportRecord, Subscription,
    UserRecord, email_local_part,
};

/// Every response is wrapped in `{status, data, message}`; auth replies also
/// carry a top-level `token`.
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl Envelope {
    /// The backend is inconsistent about casing (`success` vs `Success`).
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("success"))
    }
}

/// A list that drops elements it cannot decode instead of failing as a whole.
#[derive(Debug, Clone)]
pub struct Rows<T>(pub Vec<T>);

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Rows<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
        let rows = raw
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(index = i, error = %e, "skipping undecodable row");
                    None
                }
            })
            .collect();
        Ok(Self(rows))
    }
}

/// `null` reads as `false`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// RFC 3339 timestamp; anything else (empty, null, junk) reads as absent.
fn timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|t| t.with_timezone(&Utc)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLocation {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUser {
    #[serde(rename = "_id", default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub premium: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_blocked: bool,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub location: Option<WireLocation>,
    #[serde(default)]
    pub favorite_colors: Option<Vec<String>>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "referalCode", alias = "referralCode", default)]
    pub referral_code: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub email_verified: bool,
    #[serde(default, deserialize_with = "flag")]
    pub phone_verified: bool,
    #[serde(default, deserialize_with = "flag")]
    pub facial_verified: bool,
}

impl WireUser {
    /// Documents carry `_id`; some endpoints also expose it as `id`.
    pub fn key(&self) -> Option<&str> {
        self.object_id
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// `userId` is either populated with the user document or left as a bare id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(Box<WireUser>),
    Id(String),
}

impl UserRef {
    fn populated(&self) -> Option<&WireUser> {
        match self {
            Self::Populated(u) => Some(u),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireProfile {
    #[serde(rename = "userId", default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ProfilesData {
    #[serde(default)]
    pub profiles: Rows<WireProfile>,
}

#[derive(Debug, Deserialize)]
pub struct UsersData {
    #[serde(default)]
    pub users: Rows<WireUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireReport {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "userId", default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthData {
    #[serde(default)]
    pub user: Option<AuthUser>,
}

// ---- request bodies ----

#[derive(Debug, Serialize)]
pub struct BlockRequest<'a> {
    pub action: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

// ---- normalization ----

fn display_name(user: &WireUser) -> String {
    let first = user.first_name.as_deref().unwrap_or("");
    let last = user.last_name.as_deref().unwrap_or("");
    format!("{first} {last}").trim().to_string()
}

fn avatar(user: &WireUser) -> String {
    user.photo
        .clone()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string())
}

/// GeoJSON order is `[lng, lat]`.
fn lat_lng(location: Option<&WireLocation>) -> Option<(f64, f64)> {
    match location?.coordinates.as_slice() {
        [lng, lat, ..] => Some((*lat, *lng)),
        _ => None,
    }
}

/// Map a user document to a record. Users without an id are dropped.
pub fn user_record(user: &WireUser, images: Option<&[String]>) -> Option<UserRecord> {
    Some(UserRecord {
        id: user.key()?.to_string(),
        name: display_name(user),
        email: user.email.clone().unwrap_or_default(),
        account_type: AccountType::from_premium(user.premium),
        status: AccountStatus::from_blocked(user.is_blocked),
        joined_at: user.created_at,
        last_login_at: user.last_login,
        location: lat_lng(user.location.as_ref()),
        avatar: avatar(user),
        images: images.map(<[String]>::to_vec).unwrap_or_default(),
        subscription: Subscription {
            premium: user.premium,
            started_at: user.created_at,
            renewed_at: user.updated_at,
        },
    })
}

/// `data.profiles[].userId`, skipping profiles whose user is missing or unpopulated.
pub fn normalize_profiles(data: ProfilesData) -> Vec<UserRecord> {
    data.profiles.0.iter().filter_map(profile_record).collect()
}

pub fn profile_record(profile: &WireProfile) -> Option<UserRecord> {
    let user = profile.user.as_ref()?.populated()?;
    user_record(user, profile.images.as_deref())
}

/// `data[]` filtered to blocked accounts. Accounts without a name are
/// labelled with the local part of their email.
pub fn normalize_blocked(users: Rows<WireUser>) -> Vec<UserRecord> {
    users
        .0
        .iter()
        .filter(|u| u.is_blocked)
        .filter_map(|u| {
            let mut record = user_record(u, None)?;
            if record.name.is_empty() {
                record.name = email_local_part(&record.email).to_string();
            }
            Some(record)
        })
        .collect()
}

pub fn normalize_reports(reports: Rows<WireReport>) -> Vec<ReportRecord> {
    reports
        .0
        .into_iter()
        .enumerate()
        .map(|(i, r)| ReportRecord {
            id: r.id.unwrap_or_else(|| format!("report-{i}")),
            reporter_email: r
                .user
                .as_ref()
                .and_then(UserRef::populated)
                .and_then(|u| u.email.clone()),
            reason: r.reason.filter(|s| !s.trim().is_empty()),
            created_at: r.created_at,
        })
        .collect()
}

pub fn normalize_content(data: UsersData) -> Vec<ContentRecord> {
    data.users
        .0
        .into_iter()
        .filter_map(|u| {
            Some(ContentRecord {
                id: u.key()?.to_string(),
                first_name: u.first_name.unwrap_or_default(),
                last_name: u.last_name.filter(|s| !s.is_empty()),
                email: u.email.unwrap_or_default(),
                photo: u.photo.unwrap_or_default(),
                favorite_colors: u.favorite_colors.unwrap_or_default(),
                role: u.role.unwrap_or_else(|| "user".to_string()),
                distance_km: u.distance,
                phone: u.phone.filter(|s| !s.is_empty()),
                referral_code: u.referral_code,
                email_verified: u.email_verified,
                phone_verified: u.phone_verified,
                facial_verified: u.facial_verified,
                created_at: u.created_at,
            })
        })
        .collect()
}
