//! REST payloads exchanged with the studio backend.
//!
//! Read models mirror what the list/detail endpoints return. `*Create` and
//! `*Update` types are request bodies; update bodies skip unset fields so a
//! PATCH only touches what the operator changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operator account behind the current session.
///
/// `/auth/login` and `/auth/me` may send the identity as `login`; it lands in
/// `email` either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    #[serde(alias = "login")]
    pub email: String,
    pub role: String,
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AdminUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectionCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A scheduled class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    #[serde(default)]
    pub direction_id: Option<i64>,
    #[serde(with = "timestamp")]
    pub starts_at: DateTime<Utc>,
    pub duration_min: i32,
    pub capacity: i32,
    pub price_single_visit: f64,
    #[serde(default = "default_true")]
    pub allow_subscription: bool,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotCreate {
    pub direction_id: i64,
    pub starts_at: DateTime<Utc>,
    pub duration_min: i32,
    pub capacity: i32,
    pub price_single_visit: f64,
    pub allow_subscription: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SlotUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_single_visit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_subscription: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Query for `GET /slots`.
#[derive(Debug, Clone, Default)]
pub struct SlotFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub direction_id: Option<i64>,
}

/// Something the studio sells: a single visit, a subscription, etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub classes_count: Option<i32>,
    #[serde(default)]
    pub validity_days: Option<i32>,
    #[serde(default)]
    pub direction_limit_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductCreate {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_limit_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductUpdate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_limit_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub class_slot_id: i64,
    pub status: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingCreate {
    pub user_id: i64,
    pub class_slot_id: i64,
    pub source: String,
}

impl BookingCreate {
    /// Booking made by an operator from the admin client.
    pub fn by_admin(user_id: i64, class_slot_id: i64) -> Self {
        Self {
            user_id,
            class_slot_id,
            source: "admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingCancel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Query for `GET /bookings`.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub slot_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Dashboard counters from `GET /bookings/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingStats {
    pub total: i64,
    pub confirmed: i64,
    pub bookings_today: i64,
    /// Percent of finished bookings that were attended, `0..=100`.
    pub attendance_rate: f64,
    pub weekly_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub currency: String,
    pub purpose: String,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub class_slot_id: Option<i64>,
    pub status: String,
    pub provider: String,
    pub order_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentCreate {
    pub user_id: i64,
    pub amount: f64,
    pub currency: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_slot_id: Option<i64>,
}

/// A studio client (registered through the Telegram bot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentUser {
    pub id: i64,
    pub tg_id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of `POST /users/{id}/manual-subscription`.
#[derive(Debug, Clone, Serialize)]
pub struct ManualSubscriptionGrant {
    pub classes_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub remaining_classes: i32,
    #[serde(default)]
    pub initial_classes: Option<i32>,
    #[serde(with = "timestamp")]
    pub valid_from: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub valid_to: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingMedia {
    pub id: i64,
    pub url: String,
    pub media_type: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Studio addresses text plus attached photos/videos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioAddresses {
    pub addresses: String,
    #[serde(default)]
    pub media: Vec<SettingMedia>,
}

/// Body of `PUT /settings/addresses`.
///
/// Media not listed in `media_ids` is detached by the server.
#[derive(Debug, Clone, Serialize)]
pub struct StudioAddressesUpdate {
    pub addresses: String,
    pub media_ids: Vec<i64>,
}

fn default_true() -> bool {
    true
}

/// Timestamps arrive either as RFC 3339 or as naive ISO 8601 in UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
