use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::{reject, ApiError};
use crate::jobs::dto::{
    CreateJobRequest, JobResponse, ListJobsQuery, ListJobsResponse, MessageResponse,
    PaginationMeta, StatsResponse, StatusChangeRequest, UpdateJobRequest,
};
use crate::jobs::status::JobStatus;
use crate::jobs::{repo, services};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/stats", get(job_stats))
        .route("/jobs/:id", get(get_job))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(create_job))
        .route("/jobs/:id", put(update_job).delete(delete_job))
        .route("/jobs/:id/status", patch(update_job_status))
}

#[instrument(skip(state, user))]
pub async fn list_jobs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<ListJobsResponse>, (StatusCode, String)> {
    let status = match query.status.as_deref() {
        Some(s) => Some(
            s.parse::<JobStatus>()
                .map_err(|e| reject(ApiError::Validation(e)))?,
        ),
        None => None,
    };

    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let jobs = repo::list_by_user(
        &state.db,
        user.id,
        status,
        query.search.as_deref(),
        limit,
        offset,
    )
    .await
    .map_err(|e| reject(ApiError::from(e)))?;

    let total_jobs = repo::count_active(&state.db, user.id)
        .await
        .map_err(|e| reject(ApiError::from(e)))?;
    let stats = repo::stats_for_user(&state.db, user.id)
        .await
        .map_err(|e| reject(ApiError::from(e)))?;

    let total_pages = if total_jobs == 0 {
        0
    } else {
        (total_jobs + limit - 1) / limit
    };

    Ok(Json(ListJobsResponse {
        pagination: PaginationMeta {
            current_page: page,
            total_pages,
            total_jobs,
            has_next: (offset + jobs.len() as i64) < total_jobs,
            has_prev: page > 1,
        },
        jobs,
        stats,
    }))
}

#[instrument(skip(state, user))]
pub async fn job_stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let stats = repo::stats_for_user(&state.db, user.id)
        .await
        .map_err(|e| reject(ApiError::from(e)))?;
    Ok(Json(StatsResponse { stats }))
}

#[instrument(skip(state, user))]
pub async fn get_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, (StatusCode, String)> {
    let job = repo::find_active_by_id(&state.db, user.id, id)
        .await
        .map_err(|e| reject(ApiError::from(e)))?
        .ok_or_else(|| reject(ApiError::NotFound("Job application not found".into())))?;
    Ok(Json(JobResponse {
        message: "Job application found".into(),
        job,
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), (StatusCode, String)> {
    let job = services::create_job(&state, &user, payload)
        .await
        .map_err(reject)?;
    info!(user_id = %user.id, job_id = %job.job_id, "job application created");
    Ok((
        StatusCode::CREATED,
        Json(JobResponse {
            message: "Job application added successfully".into(),
            job,
        }),
    ))
}

#[instrument(skip(state, user, payload))]
pub async fn update_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, (StatusCode, String)> {
    let job = services::edit_fields(&state, &user, id, payload)
        .await
        .map_err(reject)?;
    Ok(Json(JobResponse {
        message: "Job application updated successfully".into(),
        job,
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn update_job_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<Json<JobResponse>, (StatusCode, String)> {
    let job =
        services::apply_status_change(&state, &user, id, &payload.status, payload.round_number)
            .await
            .map_err(reject)?;
    info!(user_id = %user.id, job_id = %job.job_id, status = %job.status, "job status updated");
    Ok(Json(JobResponse {
        message: "Job status updated successfully".into(),
        job,
    }))
}

#[instrument(skip(state, user))]
pub async fn delete_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    services::delete_job(&state, user.id, id)
        .await
        .map_err(reject)?;
    Ok(Json(MessageResponse {
        message: "Job application deleted successfully".into(),
    }))
}
