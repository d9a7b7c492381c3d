use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::program::{
    CreateExerciseRequest, CreateProgramRequest, CreateTrainingDayRequest, Exercise, Program,
    TrainingDay, TrainingDayWithExercises, UpdateExerciseRequest, UpdateProgramRequest,
};
use crate::AppState;

/// Trims `value`, rejecting input that is empty once whitespace is removed.
fn non_blank<'a>(value: &'a str, message: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(message.into()));
    }
    Ok(trimmed)
}

/// `non_blank` for optional fields of a partial update.
fn non_blank_opt<'a>(value: Option<&'a str>, message: &str) -> AppResult<Option<&'a str>> {
    value.map(|v| non_blank(v, message)).transpose()
}

pub(crate) async fn find_program(db: &PgPool, user_id: Uuid, program_id: Uuid) -> AppResult<Program> {
    sqlx::query_as::<_, Program>("SELECT * FROM programs WHERE id = $1 AND user_id = $2")
        .bind(program_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Program not found".into()))
}

/// Looks up a training day, checking the program belongs to `user_id`.
pub(crate) async fn find_day(
    db: &PgPool,
    user_id: Uuid,
    program_id: Uuid,
    day_id: Uuid,
) -> AppResult<TrainingDay> {
    sqlx::query_as::<_, TrainingDay>(
        r#"
        SELECT d.* FROM training_days d
        JOIN programs p ON p.id = d.program_id
        WHERE d.id = $1 AND d.program_id = $2 AND p.user_id = $3
        "#,
    )
    .bind(day_id)
    .bind(program_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound("Training day not found".into()))
}

pub(crate) async fn list_programs_for(db: &PgPool, user_id: Uuid) -> AppResult<Vec<Program>> {
    let programs = sqlx::query_as::<_, Program>(
        "SELECT * FROM programs WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(programs)
}

// ── Programs ─────────────────────────────────────────────────────────────

pub async fn list_programs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Program>>> {
    Ok(Json(list_programs_for(&state.db, auth_user.id).await?))
}

pub async fn create_program(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateProgramRequest>,
) -> AppResult<Json<Program>> {
    body.validate()?;
    let name = non_blank(&body.name, "Program name is required")?;

    let program = sqlx::query_as::<_, Program>(
        r#"
        INSERT INTO programs (id, user_id, name, description)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(name)
    .bind(&body.description)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(program))
}

pub async fn get_program(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(program_id): Path<Uuid>,
) -> AppResult<Json<Program>> {
    Ok(Json(find_program(&state.db, auth_user.id, program_id).await?))
}

pub async fn update_program(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(program_id): Path<Uuid>,
    Json(body): Json<UpdateProgramRequest>,
) -> AppResult<Json<Program>> {
    body.validate()?;
    let name = non_blank_opt(body.name.as_deref(), "Program name is required")?;

    let program = sqlx::query_as::<_, Program>(
        r#"
        UPDATE programs SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            is_active = COALESCE($5, is_active),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(program_id)
    .bind(auth_user.id)
    .bind(name)
    .bind(&body.description)
    .bind(body.is_active)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Program not found".into()))?;

    Ok(Json(program))
}

pub async fn delete_program(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(program_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM programs WHERE id = $1 AND user_id = $2")
        .bind(program_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Program not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true, "id": program_id })))
}

// ── Training days ────────────────────────────────────────────────────────

pub async fn list_days(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(program_id): Path<Uuid>,
) -> AppResult<Json<Vec<TrainingDay>>> {
    find_program(&state.db, auth_user.id, program_id).await?;

    let days = sqlx::query_as::<_, TrainingDay>(
        r#"
        SELECT * FROM training_days
        WHERE program_id = $1
        ORDER BY day_order ASC, created_at ASC
        "#,
    )
    .bind(program_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(days))
}

pub async fn create_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(program_id): Path<Uuid>,
    Json(body): Json<CreateTrainingDayRequest>,
) -> AppResult<Json<TrainingDay>> {
    body.validate()?;
    let title = non_blank(&body.title, "Day title is required")?;
    find_program(&state.db, auth_user.id, program_id).await?;

    // Without an explicit order the day goes after the current last one.
    let day = sqlx::query_as::<_, TrainingDay>(
        r#"
        INSERT INTO training_days (id, program_id, title, day_order)
        VALUES (
            $1, $2, $3,
            COALESCE(
                $4,
                (SELECT COALESCE(MAX(day_order) + 1, 0) FROM training_days WHERE program_id = $2)
            )
        )
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(program_id)
    .bind(title)
    .bind(body.order)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(day))
}

pub async fn get_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((program_id, day_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<TrainingDayWithExercises>> {
    let day = find_day(&state.db, auth_user.id, program_id, day_id).await?;
    let exercises = exercises_for_day(&state.db, day_id).await?;
    Ok(Json(TrainingDayWithExercises { day, exercises }))
}

pub async fn delete_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((program_id, day_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    find_day(&state.db, auth_user.id, program_id, day_id).await?;

    sqlx::query("DELETE FROM training_days WHERE id = $1")
        .bind(day_id)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "deleted": true, "id": day_id })))
}

// ── Exercises ────────────────────────────────────────────────────────────

async fn exercises_for_day(db: &PgPool, day_id: Uuid) -> AppResult<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT * FROM exercises WHERE day_id = $1 ORDER BY created_at ASC",
    )
    .bind(day_id)
    .fetch_all(db)
    .await?;
    Ok(exercises)
}

pub async fn list_exercises(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((program_id, day_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<Exercise>>> {
    find_day(&state.db, auth_user.id, program_id, day_id).await?;
    Ok(Json(exercises_for_day(&state.db, day_id).await?))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((program_id, day_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<CreateExerciseRequest>,
) -> AppResult<Json<Exercise>> {
    body.validate()?;
    let name = non_blank(&body.name, "Exercise name is required")?;
    find_day(&state.db, auth_user.id, program_id, day_id).await?;

    let exercise = sqlx::query_as::<_, Exercise>(
        r#"
        INSERT INTO exercises (id, day_id, name, target_sets, target_reps, target_weight)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(day_id)
    .bind(name)
    .bind(body.target_sets)
    .bind(body.target_reps)
    .bind(body.target_weight)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(exercise))
}

pub async fn update_exercise(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((program_id, day_id, exercise_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(body): Json<UpdateExerciseRequest>,
) -> AppResult<Json<Exercise>> {
    body.validate()?;
    let name = non_blank_opt(body.name.as_deref(), "Exercise name is required")?;
    find_day(&state.db, auth_user.id, program_id, day_id).await?;

    let exercise = sqlx::query_as::<_, Exercise>(
        r#"
        UPDATE exercises SET
            name = COALESCE($3, name),
            target_sets = COALESCE($4, target_sets),
            target_reps = COALESCE($5, target_reps),
            target_weight = COALESCE($6, target_weight),
            updated_at = NOW()
        WHERE id = $1 AND day_id = $2
        RETURNING *
        "#,
    )
    .bind(exercise_id)
    .bind(day_id)
    .bind(name)
    .bind(body.target_sets)
    .bind(body.target_reps)
    .bind(body.target_weight)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Exercise not found".into()))?;

    Ok(Json(exercise))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((program_id, day_id, exercise_id)): Path<(Uuid, Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    find_day(&state.db, auth_user.id, program_id, day_id).await?;

    let result = sqlx::query("DELETE FROM exercises WHERE id = $1 AND day_id = $2")
        .bind(exercise_id)
        .bind(day_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Exercise not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true, "id": exercise_id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_trims() {
        assert_eq!(non_blank("  Leg Day ", "required").unwrap(), "Leg Day");
    }

    #[test]
    fn test_non_blank_rejects_whitespace_only() {
        let err = non_blank("   ", "Day title is required").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Day title is required"));
    }

    #[test]
    fn test_non_blank_opt_passes_missing_field() {
        assert_eq!(non_blank_opt(None, "required").unwrap(), None);
        assert_eq!(non_blank_opt(Some(" Squat "), "required").unwrap(), Some("Squat"));
        assert!(non_blank_opt(Some("\t "), "required").is_err());
    }
}
