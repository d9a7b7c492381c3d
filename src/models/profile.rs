use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::program::Program;
use crate::models::workout::{ActivityDay, StreakData};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub is_public: bool,
    pub show_programs: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lowercases and drops everything outside `[a-z0-9_]`.
pub fn normalize_username(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Expects an already-normalized username.
pub fn is_valid_username(username: &str) -> bool {
    (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username.len())
}

/// POST /api/profile
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    pub username: String,

    #[validate(length(min = 1, max = 50, message = "Display name must be 1-50 characters"))]
    pub display_name: String,

    #[validate(length(max = 280, message = "Bio must be under 280 characters"))]
    pub bio: Option<String>,

    #[validate(url(message = "Profile picture must be a URL"))]
    pub profile_picture: Option<String>,
}

/// PUT /api/profile — partial update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "Display name must be 1-50 characters"))]
    pub display_name: Option<String>,

    #[validate(length(max = 280, message = "Bio must be under 280 characters"))]
    pub bio: Option<String>,

    #[validate(url(message = "Profile picture must be a URL"))]
    pub profile_picture: Option<String>,

    pub is_public: Option<bool>,
    pub show_programs: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UsernameAvailability {
    pub username: String,
    pub available: bool,
}

/// GET /api/profiles/:username
#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub profile: Profile,
    pub is_own_profile: bool,
    pub streak: StreakData,
    pub weekly_activity: Vec<ActivityDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programs: Option<Vec<Program>>,
}
