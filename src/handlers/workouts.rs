use axum::{
    extract::{Query, State},
    Extension, Json,
};
use sqlx::types::Json as SqlJson;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::find_user;
use crate::handlers::programs::find_day;
use crate::models::workout::{
    FinishWorkoutRequest, HistoryQuery, StatsQuery, StatsResponse, WorkoutCompletion,
};
use crate::services::streak::{StreakCalculator, DEFAULT_WINDOW_DAYS};
use crate::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 200;
const MAX_WINDOW_DAYS: usize = 90;

/// Full completion history for a user, in no particular order.
pub(crate) async fn completions_for(db: &PgPool, user_id: Uuid) -> AppResult<Vec<WorkoutCompletion>> {
    let completions = sqlx::query_as::<_, WorkoutCompletion>(
        "SELECT * FROM workout_completions WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(completions)
}

pub async fn finish_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<FinishWorkoutRequest>,
) -> AppResult<Json<WorkoutCompletion>> {
    body.validate()?;

    let day = find_day(&state.db, auth_user.id, body.program_id, body.day_id).await?;

    let completion = sqlx::query_as::<_, WorkoutCompletion>(
        r#"
        INSERT INTO workout_completions (id, user_id, program_id, day_id, day_name, exercises)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.program_id)
    .bind(day.id)
    .bind(&day.title)
    .bind(SqlJson(&body.exercises))
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        user_id = %auth_user.id,
        completion_id = %completion.id,
        exercises = body.exercises.len(),
        "Workout finished"
    );

    Ok(Json(completion))
}

pub async fn workout_history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<WorkoutCompletion>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let completions = sqlx::query_as::<_, WorkoutCompletion>(
        r#"
        SELECT * FROM workout_completions
        WHERE user_id = $1
        ORDER BY completed_at DESC
        LIMIT $2
        "#,
    )
    .bind(auth_user.id)
    .bind(limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(completions))
}

pub async fn my_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StatsResponse>> {
    let window_days = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
        return Err(AppError::Validation(format!(
            "window_days must be between 1 and {MAX_WINDOW_DAYS}"
        )));
    }

    let user = find_user(&state.db, auth_user.id).await?;
    let completions = completions_for(&state.db, auth_user.id).await?;

    let calculator = StreakCalculator::now(user.local_offset());
    Ok(Json(StatsResponse {
        as_of: calculator.today(),
        streak: calculator.calculate_streak_data(&completions),
        weekly_activity: calculator.activity_days(&completions, window_days),
    }))
}
