use axum::http::StatusCode;
use thiserror::Error;

/// Error taxonomy for the job-tracking core. Validation, conflict and
/// not-found errors are rejected before any mutation; persistence errors are
/// fatal to the operation that hit them; notify errors stay internal and are
/// only logged (a state change succeeds even when its email does not go out).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Persistence(anyhow::Error),

    #[error("notification error: {0}")]
    Notify(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Persistence(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) | ApiError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for (StatusCode, String) {
    fn from(err: ApiError) -> Self {
        let status = err.status();
        let message = match &err {
            // Do not leak driver details to clients.
            ApiError::Persistence(e) => {
                tracing::error!(error = %e, "persistence failure");
                "Server error. Please try again.".to_string()
            }
            other => other.to_string(),
        };
        (status, message)
    }
}

/// Handler-boundary mapping to axum's rejection tuple.
pub fn reject(err: ApiError) -> (StatusCode, String) {
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_http_codes() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Persistence(anyhow::anyhow!("connection reset")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_errors_are_not_leaked() {
        let (status, message): (StatusCode, String) =
            ApiError::Persistence(anyhow::anyhow!("connection reset")).into();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("connection reset"));
    }

    #[test]
    fn validation_message_reaches_the_client() {
        let (_, message): (StatusCode, String) =
            ApiError::Validation("Round number must be at least 1".into()).into();
        assert_eq!(message, "Round number must be at least 1");
    }
}
