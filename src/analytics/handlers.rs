use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::analytics::dto::AnalyticsResponse;
use crate::analytics::services::aggregate;
use crate::auth::extractors::AuthUser;
use crate::error::{reject, ApiError};
use crate::jobs::repo;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/analytics", get(get_analytics))
}

#[instrument(skip(state, user))]
pub async fn get_analytics(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<AnalyticsResponse>, (StatusCode, String)> {
    // Read-only: a query failure fails the whole request, never a partial
    // result.
    let jobs = repo::all_active_for_user(&state.db, user.id)
        .await
        .map_err(|e| reject(ApiError::from(e)))?;

    let now = OffsetDateTime::now_utc();
    Ok(Json(aggregate(
        &jobs,
        now,
        &state.config.analytics.interview_statuses,
    )))
}
