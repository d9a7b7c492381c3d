use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::jwt::{verify_token, TokenType};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Set by `optional_auth`; `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn authenticate(token: &str, config: &Config) -> AppResult<AuthUser> {
    let token_data = verify_token(token, config)?;

    if token_data.claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized);
    }

    Ok(AuthUser {
        id: token_data.claims.sub,
        email: token_data.claims.email,
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or(AppError::Unauthorized)?;
    let auth_user = authenticate(token, &state.config)?;

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

/// Like `require_auth`, but lets anonymous requests through. A header that
/// is present but invalid is still rejected.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(_) => {
            let token = bearer_token(req.headers()).ok_or(AppError::Unauthorized)?;
            Some(authenticate(token, &state.config)?)
        }
    };

    req.extensions_mut().insert(MaybeAuthUser(auth_user));
    Ok(next.run(req).await)
}
