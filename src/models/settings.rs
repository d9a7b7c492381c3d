use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const DEFAULT_REST_DURATION_SECS: i32 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSettings {
    pub rest_timer_enabled: bool,
    pub rest_duration_secs: i32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            rest_timer_enabled: true,
            rest_duration_secs: DEFAULT_REST_DURATION_SECS,
        }
    }
}

/// PUT /api/settings — partial update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub rest_timer_enabled: Option<bool>,

    #[validate(range(min = 10, max = 600, message = "Rest duration must be 10-600 seconds"))]
    pub rest_duration_secs: Option<i32>,
}

impl UpdateSettingsRequest {
    /// Applies the provided fields on top of `current`.
    pub fn apply(&self, current: UserSettings) -> UserSettings {
        UserSettings {
            rest_timer_enabled: self.rest_timer_enabled.unwrap_or(current.rest_timer_enabled),
            rest_duration_secs: self.rest_duration_secs.unwrap_or(current.rest_duration_secs),
        }
    }
}
