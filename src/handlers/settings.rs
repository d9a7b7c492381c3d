use axum::{extract::State, Extension, Json};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::settings::{UpdateSettingsRequest, UserSettings};
use crate::AppState;

/// Stored settings, or the defaults for users who never saved any.
async fn load_settings(db: &PgPool, user_id: Uuid) -> AppResult<UserSettings> {
    let settings = sqlx::query_as::<_, UserSettings>(
        "SELECT rest_timer_enabled, rest_duration_secs FROM user_settings WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .unwrap_or_default();
    Ok(settings)
}

pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserSettings>> {
    Ok(Json(load_settings(&state.db, auth_user.id).await?))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateSettingsRequest>,
) -> AppResult<Json<UserSettings>> {
    body.validate()?;

    let updated = body.apply(load_settings(&state.db, auth_user.id).await?);

    let settings = sqlx::query_as::<_, UserSettings>(
        r#"
        INSERT INTO user_settings (user_id, rest_timer_enabled, rest_duration_secs)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET
            rest_timer_enabled = EXCLUDED.rest_timer_enabled,
            rest_duration_secs = EXCLUDED.rest_duration_secs,
            updated_at = NOW()
        RETURNING rest_timer_enabled, rest_duration_secs
        "#,
    )
    .bind(auth_user.id)
    .bind(updated.rest_timer_enabled)
    .bind(updated.rest_duration_secs)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(settings))
}
