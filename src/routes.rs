// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{health, quiz, take},
    state::AppState,
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

/// Assembles the main application router.
///
/// * Teacher routes under `/api/quizzes` require a bearer token.
/// * Taker routes under `/api/take/{link}` accept one optionally.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/", post(quiz::create_quiz).get(quiz::list_quizzes))
        .route("/{id}", get(quiz::get_quiz).delete(quiz::delete_quiz))
        .route("/{id}/settings", put(quiz::update_settings))
        .route("/{id}/results", get(quiz::get_results))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let take_routes = Router::new()
        .route("/{link}", get(take::resolve_quiz))
        .route("/{link}/start", post(take::start_session))
        .route("/{link}/submit", post(take::submit_session))
        .route("/{link}/auto-submit", post(take::auto_submit_session))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/take", take_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
