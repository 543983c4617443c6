use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// The applicant form is served from another origin and calls the public
/// routes directly; staff tools send a bearer token.
pub fn api_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(Any)
}
