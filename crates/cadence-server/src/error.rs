//! HTTP error mapping.
//!
//! Validation failures surface their message verbatim with a 400; auth
//! failures are 401; unknown or foreign-owned entities are 404; payment
//! collaborator failures are 502. Nothing here is fatal to the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use cadence_core::CoreError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Upstream(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{entity} '{id}' not found"))
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m)
            | ApiError::NotFound(m)
            | ApiError::Upstream(m)
            | ApiError::Internal(m) => m,
            ApiError::Unauthorized => "missing or invalid bearer token",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self.message(), "request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ApiError::BadRequest(v.to_string()),
            CoreError::NotFound { entity, id } => ApiError::not_found(entity, &id),
            CoreError::Payment(p) => ApiError::Upstream(p.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<cadence_core::ValidationError> for ApiError {
    fn from(err: cadence_core::ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<cadence_core::PaymentError> for ApiError {
    fn from(err: cadence_core::PaymentError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::ValidationError;

    #[test]
    fn validation_maps_to_bad_request_with_verbatim_message() {
        let err: ApiError = CoreError::Validation(ValidationError::MissingField("title")).into();
        assert!(matches!(&err, ApiError::BadRequest(m) if m.contains("title")));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn payment_maps_to_bad_gateway() {
        let err: ApiError =
            CoreError::Payment(cadence_core::PaymentError::NotConfigured).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
