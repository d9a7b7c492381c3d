use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::profile::Profile;

pub const MIN_UTC_OFFSET_MINUTES: i32 = -12 * 60;
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub utc_offset_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user's local UTC offset. Out-of-range stored values fall back to UTC.
    pub fn local_offset(&self) -> FixedOffset {
        local_offset(self.utc_offset_minutes)
    }
}

pub fn local_offset(utc_offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// GET /api/me
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub utc_offset_minutes: i32,
    pub profile: Option<Profile>,
    pub created_at: DateTime<Utc>,
}

impl AccountResponse {
    pub fn new(user: User, profile: Option<Profile>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            utc_offset_minutes: user.utc_offset_minutes,
            profile,
            created_at: user.created_at,
        }
    }
}

/// PUT /api/me/timezone
#[derive(Debug, Deserialize)]
pub struct UpdateTimezoneRequest {
    pub utc_offset_minutes: i32,
}

impl UpdateTimezoneRequest {
    pub fn is_valid(&self) -> bool {
        (MIN_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&self.utc_offset_minutes)
    }
}
