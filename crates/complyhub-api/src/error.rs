//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use complyhub_core::error::{AppError, ErrorKind, FieldError};

/// Message sent instead of the real one for server-side failures.
const INTERNAL_MESSAGE: &str = "Something went wrong while processing the request";

/// Handler error. Wraps [`AppError`] so it can be rendered as a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type returned by handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Failed response body.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<()>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Storage
        | ErrorKind::Configuration
        | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);

        let message = if err.kind.is_server_error() {
            tracing::error!(
                kind = %err.kind,
                error = %err.message,
                source = ?err.source,
                "Request failed"
            );
            INTERNAL_MESSAGE.to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            success: false,
            message,
            data: None,
            errors: err.errors,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Authentication), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Authorization), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Database), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let response = ApiError(
            AppError::validation("Email is invalid")
                .with_errors(vec![FieldError::new("email", "Email is invalid")]),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email is invalid");
        assert!(body["data"].is_null());
        assert_eq!(body["errors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let response = ApiError(AppError::database("relation \"users\" does not exist")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], INTERNAL_MESSAGE);
        assert!(body.get("errors").is_none());
    }
}
