//! HTTP mapping of gradebook errors.

use super::types::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gradebook_core::GradebookError;

/// A `GradebookError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub GradebookError);

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GradebookError::DuplicateRollNumber(_) => StatusCode::CONFLICT,
            GradebookError::NotFound(_)
            | GradebookError::GradeNotFound(_)
            | GradebookError::NoGrades(_) => StatusCode::NOT_FOUND,
            GradebookError::OutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GradebookError::InvalidInput(_) | GradebookError::InvalidScore(_) => {
                StatusCode::BAD_REQUEST
            }
            GradebookError::SerializationError(_) | GradebookError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<GradebookError> for ApiError {
    fn from(err: GradebookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "Request failed");
        } else {
            tracing::warn!(kind = self.0.kind(), error = %self.0, "Request rejected");
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradebook_core::{GradeId, RollNumber};

    fn roll() -> RollNumber {
        RollNumber::parse("R1").expect("roll")
    }

    #[test]
    fn status_per_kind() {
        let cases = [
            (GradebookError::DuplicateRollNumber(roll()), StatusCode::CONFLICT),
            (GradebookError::NotFound(roll()), StatusCode::NOT_FOUND),
            (GradebookError::NoGrades(roll()), StatusCode::NOT_FOUND),
            (GradebookError::GradeNotFound(GradeId(3)), StatusCode::NOT_FOUND),
            (
                GradebookError::OutOfRange("101".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                GradebookError::InvalidScore("abc".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                GradebookError::IoError("disk".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }
}
