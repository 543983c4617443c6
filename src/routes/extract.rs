use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::dto::candidate_dto::ApiResponse;

/// `axum::Json` whose rejection is answered with the `{data, error}` envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ExtractRejection))]
pub struct Json<T>(pub T);

/// `axum::extract::Path` whose rejection is answered with the envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ExtractRejection))]
pub struct Path<T>(pub T);

#[derive(Debug)]
pub struct ExtractRejection {
    status: StatusCode,
    message: String,
}

impl From<JsonRejection> for ExtractRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ExtractRejection {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ExtractRejection {
    fn into_response(self) -> Response {
        tracing::debug!("Rejected request: {}", self.message);
        ApiResponse::<Option<()>> {
            data: None,
            error: Some(self.message),
            http_status: self.status,
        }
        .into_response()
    }
}
