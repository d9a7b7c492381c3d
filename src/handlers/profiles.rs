use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::middleware::{AuthUser, MaybeAuthUser};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::find_user;
use crate::handlers::programs::list_programs_for;
use crate::handlers::workouts::completions_for;
use crate::models::profile::{
    is_valid_username, normalize_username, CreateProfileRequest, Profile, PublicProfileResponse,
    UpdateProfileRequest, UsernameAvailability, UsernameQuery,
};
use crate::services::streak::{StreakCalculator, DEFAULT_WINDOW_DAYS};
use crate::AppState;

async fn username_taken(db: &PgPool, username: &str) -> AppResult<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM profiles WHERE username = $1)",
    )
    .bind(username)
    .fetch_one(db)
    .await?;
    Ok(taken)
}

pub async fn username_available(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<UsernameAvailability>> {
    let username = normalize_username(&query.username);
    let available = is_valid_username(&username) && !username_taken(&state.db, &username).await?;

    Ok(Json(UsernameAvailability {
        username,
        available,
    }))
}

pub async fn create_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateProfileRequest>,
) -> AppResult<Json<Profile>> {
    body.validate()?;

    let username = normalize_username(&body.username);
    if !is_valid_username(&username) {
        return Err(AppError::Validation(
            "Username must be 3-20 characters".into(),
        ));
    }

    let display_name = body.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::Validation("Display name is required".into()));
    }

    let has_profile = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM profiles WHERE user_id = $1)",
    )
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?;
    if has_profile {
        return Err(AppError::Conflict("Profile already exists".into()));
    }

    if username_taken(&state.db, &username).await? {
        return Err(AppError::Conflict("Username not available".into()));
    }

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, username, display_name, bio, profile_picture)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(&username)
    .bind(display_name)
    .bind(&body.bio)
    .bind(&body.profile_picture)
    .fetch_one(&state.db)
    .await
    // Lost a race with another signup for the same name.
    .map_err(|e| AppError::conflict_on_unique(e, "Username not available"))?;

    tracing::info!(user_id = %auth_user.id, username = %profile.username, "Profile created");

    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    body.validate()?;

    let display_name = body.display_name.as_deref().map(str::trim);
    if display_name == Some("") {
        return Err(AppError::Validation("Display name is required".into()));
    }

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles SET
            display_name = COALESCE($2, display_name),
            bio = COALESCE($3, bio),
            profile_picture = COALESCE($4, profile_picture),
            is_public = COALESCE($5, is_public),
            show_programs = COALESCE($6, show_programs),
            updated_at = NOW()
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(display_name)
    .bind(&body.bio)
    .bind(&body.profile_picture)
    .bind(body.is_public)
    .bind(body.show_programs)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Profile not found".into()))?;

    Ok(Json(profile))
}

/// Public profile page data. Private profiles are visible to their owner only.
pub async fn get_public_profile(
    State(state): State<AppState>,
    Extension(MaybeAuthUser(viewer)): Extension<MaybeAuthUser>,
    Path(username): Path<String>,
) -> AppResult<Json<PublicProfileResponse>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE username = $1")
        .bind(normalize_username(&username))
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;

    let is_own_profile = viewer.map_or(false, |v| v.id == profile.user_id);
    if !profile.is_public && !is_own_profile {
        return Err(AppError::Forbidden);
    }

    let owner = find_user(&state.db, profile.user_id).await?;
    let completions = completions_for(&state.db, owner.id).await?;
    let calculator = StreakCalculator::now(owner.local_offset());

    let programs = if profile.show_programs || is_own_profile {
        Some(list_programs_for(&state.db, owner.id).await?)
    } else {
        None
    };

    Ok(Json(PublicProfileResponse {
        streak: calculator.calculate_streak_data(&completions),
        weekly_activity: calculator.activity_days(&completions, DEFAULT_WINDOW_DAYS),
        programs,
        is_own_profile,
        profile,
    }))
}
