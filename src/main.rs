use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boga_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();
}

fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    // Anonymous viewers allowed; owners additionally see private profiles.
    let profile_view_routes = Router::new()
        .route(
            "/api/profiles/:username",
            get(handlers::profiles::get_public_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::optional_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes)
        .merge(profile_view_routes);

    let protected_routes = Router::new()
        // Account
        .route("/api/me", get(handlers::auth::me))
        .route("/api/me/timezone", put(handlers::auth::update_timezone))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Profile
        .route(
            "/api/profile",
            post(handlers::profiles::create_profile).put(handlers::profiles::update_profile),
        )
        .route(
            "/api/profile/username-available",
            get(handlers::profiles::username_available),
        )
        // Settings
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        // Programs
        .route(
            "/api/programs",
            get(handlers::programs::list_programs).post(handlers::programs::create_program),
        )
        .route(
            "/api/programs/:id",
            get(handlers::programs::get_program)
                .put(handlers::programs::update_program)
                .delete(handlers::programs::delete_program),
        )
        // Training days
        .route(
            "/api/programs/:id/days",
            get(handlers::programs::list_days).post(handlers::programs::create_day),
        )
        .route(
            "/api/programs/:id/days/:day_id",
            get(handlers::programs::get_day).delete(handlers::programs::delete_day),
        )
        // Exercises
        .route(
            "/api/programs/:id/days/:day_id/exercises",
            get(handlers::programs::list_exercises).post(handlers::programs::create_exercise),
        )
        .route(
            "/api/programs/:id/days/:day_id/exercises/:exercise_id",
            put(handlers::programs::update_exercise).delete(handlers::programs::delete_exercise),
        )
        // Workouts & stats
        .route("/api/workouts/finish", post(handlers::workouts::finish_workout))
        .route("/api/workouts/history", get(handlers::workouts::workout_history))
        .route("/api/stats", get(handlers::workouts::my_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed_origins = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Arc::new(Config::from_env()?);

    let db = db::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");

    let rate_limiter = RateLimitState::new();
    auth::rate_limit::spawn_cleanup_worker(rate_limiter.clone());

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter,
    };

    let app = build_router(state).layer(cors_layer(&config)?);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    // Client IP is needed for rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    Ok(())
}
