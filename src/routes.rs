// src/routes.rs

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use url::Url;

use crate::{
    handlers::{admin, attempt, auth, catalog, summary},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, catalog, attempt, summary, admin).
/// * Applies global middleware (Trace, CORS) and a rate limit on the
///   credential endpoints.
/// * Injects global state (pool, config, attempt store).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| {
            if Url::parse(origin).is_err() {
                tracing::warn!("Ignoring malformed CORS origin: {}", origin);
                return false;
            }
            true
        })
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Brute-force shield on the credential endpoints. Keyed by peer IP,
    // so the server must be started with connect info (see main.rs).
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(20)
        .finish()
        .unwrap();

    let governor_conf = Arc::new(governor_conf);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(GovernorLayer::new(governor_conf));

    // Browsing and quiz taking, any signed-in account.
    let user_routes = Router::new()
        .route("/subjects", get(catalog::list_subjects))
        .route("/subjects/{id}/chapters", get(catalog::list_chapters))
        .route("/chapters/{id}/quizzes", get(catalog::list_quizzes))
        .route("/quizzes/{id}", get(catalog::get_quiz))
        .route(
            "/quizzes/{id}/attempt",
            post(attempt::start_attempt).get(attempt::view_attempt),
        )
        .route("/quizzes/{id}/attempt/answer", post(attempt::answer_attempt))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let summary_routes = Router::new()
        .route("/me", get(summary::my_summary))
        // Protected summary route
        .merge(
            Router::new()
                .route("/admin", get(summary::admin_summary))
                .layer(middleware::from_fn(admin_middleware)),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/subjects", post(admin::create_subject))
        .route(
            "/subjects/{id}",
            put(admin::update_subject).delete(admin::delete_subject),
        )
        .route("/chapters", post(admin::create_chapter))
        .route(
            "/chapters/{id}",
            put(admin::update_chapter).delete(admin::delete_chapter),
        )
        .route("/quizzes", post(admin::create_quiz))
        .route(
            "/quizzes/{id}",
            put(admin::update_quiz).delete(admin::delete_quiz),
        )
        .route(
            "/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route(
            "/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", user_routes)
        .nest("/api/summary", summary_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
