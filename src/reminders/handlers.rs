use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::auth::extractors::AuthUser;
use crate::reminders::scanner;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/notifications/check-deadlines", post(check_deadlines))
}

/// Manual trigger for the deadline scan, restricted to admins.
#[instrument(skip(state, user))]
pub async fn check_deadlines(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    if !user.is_admin {
        return Err((
            StatusCode::FORBIDDEN,
            "Unauthorized: Admin access required".into(),
        ));
    }

    let outcome = scanner::run_scan_once(&state).await;
    if outcome.success {
        Ok(Json(ScanResponse {
            success: true,
            message: format!(
                "Deadline check completed successfully. Found {} upcoming deadlines.",
                outcome.count
            ),
            count: outcome.count,
        }))
    } else {
        Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            outcome
                .error
                .unwrap_or_else(|| "Failed to check deadlines".into()),
        ))
    }
}
