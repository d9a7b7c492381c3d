use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A finished workout session. Streaks and activity charts are derived
/// from `completed_at` only; the rest is carried along for history views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutCompletion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub program_id: Uuid,
    pub day_id: Uuid,
    pub day_name: String,
    pub exercises: Json<Vec<ExerciseSummary>>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExerciseSummary {
    #[validate(length(min = 1, max = 100, message = "Exercise name must be 1-100 characters"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    pub weight: f64,
    #[validate(range(min = 0, max = 100, message = "Completed sets must be 0-100"))]
    pub completed_sets: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FinishWorkoutRequest {
    pub program_id: Uuid,
    pub day_id: Uuid,
    #[validate]
    #[serde(default)]
    pub exercises: Vec<ExerciseSummary>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub window_days: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakData {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_workouts: usize,
}

/// One bar of the activity chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// The user's local calendar day the figures are relative to.
    pub as_of: NaiveDate,
    pub streak: StreakData,
    pub weekly_activity: Vec<ActivityDay>,
}
