//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use brewhub_domain::error::{BrewError, ValidationError};

/// JSON error body returned by every endpoint.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`BrewError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(BrewError);

impl From<BrewError> for ApiError {
    fn from(err: BrewError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(BrewError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            BrewError::Validation(err) => {
                (StatusCode::BAD_REQUEST, format!("{}: {err}", self.0))
            }
            BrewError::AlreadyScheduled
            | BrewError::NothingScheduled
            | BrewError::SequencerBusy => (StatusCode::CONFLICT, self.0.to_string()),
            BrewError::ClockRead(_) | BrewError::Actuator { .. } => {
                tracing::error!(error = %self.0, "hardware error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
