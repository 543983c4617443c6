pub mod candidate_routes;
pub mod extract;
pub mod health;
pub mod public;
pub mod webhook;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth, cors, rate_limit};
use crate::AppState;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct RouteLimits {
    pub public_rps: u32,
    pub integration_rps: u32,
}

pub fn router(state: AppState, limits: RouteLimits) -> Router {
    let base_routes = Router::new().route("/health", get(health::health));

    let staff_api = Router::new()
        .route(
            "/api/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::create_candidate),
        )
        .route(
            "/api/candidates/bulk",
            post(candidate_routes::bulk_create_candidates),
        )
        .route(
            "/api/candidates/stats",
            get(candidate_routes::get_recruitment_stats),
        )
        .route(
            "/api/candidates/:id",
            get(candidate_routes::get_candidate).patch(candidate_routes::update_candidate),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_staff,
        ))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(limits.integration_rps),
            rate_limit::rps_middleware,
        ));

    let public_api = Router::new()
        .route(
            "/api/public/applications/:token",
            get(public::get_application).patch(public::save_application),
        )
        .route(
            "/api/public/applications/:token/submit",
            post(public::submit_application),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(limits.public_rps),
            rate_limit::rps_middleware,
        ));

    let webhook_api = Router::new()
        .route(
            "/api/webhook/analysis",
            post(webhook::handle_analysis_result),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(limits.integration_rps),
            rate_limit::rps_middleware,
        ));

    base_routes
        .merge(staff_api)
        .merge(public_api)
        .merge(webhook_api)
        .with_state(state)
        .layer(cors::api_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
