use tracing::warn;
use uuid::Uuid;

use crate::auth::is_valid_email;
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::jobs::dto::{CreateJobRequest, UpdateJobRequest};
use crate::jobs::repo::{self, Job, JobPatch, NewJob};
use crate::jobs::status::JobStatus;
use crate::state::AppState;

pub async fn create_job(
    state: &AppState,
    user: &User,
    req: CreateJobRequest,
) -> Result<Job, ApiError> {
    let new = validate_create(req)?;

    if repo::external_id_taken(&state.db, user.id, &new.job_id, None).await? {
        return Err(ApiError::Conflict(
            "A job application with this Job ID already exists".into(),
        ));
    }

    let job = repo::insert(&state.db, user.id, new).await?;
    Ok(job)
}

/// Status transition: one atomic write of status + optional round + recency
/// stamp, then a best-effort notification when the status actually changed.
/// The round is never reset by a transition that does not name one.
pub async fn apply_status_change(
    state: &AppState,
    user: &User,
    id: Uuid,
    new_status: &str,
    new_round: Option<i32>,
) -> Result<Job, ApiError> {
    let new_status: JobStatus = new_status.parse().map_err(ApiError::Validation)?;
    if let Some(round) = new_round {
        if round < 1 {
            return Err(ApiError::Validation(
                "Round number must be at least 1".into(),
            ));
        }
    }

    let existing = repo::find_active_by_id(&state.db, user.id, id)
        .await?
        .ok_or_else(job_not_found)?;
    let old_status = existing.status;

    let job = repo::update_status(&state.db, existing.id, new_status, new_round)
        .await?
        .ok_or_else(job_not_found)?;

    // Notification strictly follows successful persistence and never fails
    // the transition; a no-op update sends nothing.
    if old_status != new_status {
        if let Err(e) = state
            .notifier
            .notify_status_change(&user.email, &user.name, &job, old_status, new_status)
            .await
            .map_err(|e| ApiError::Notify(e.to_string()))
        {
            warn!(error = %e, job_id = %job.job_id, "status-change email failed");
        }
    }

    Ok(job)
}

/// General field edit. Absent fields stay untouched, `last_updated` always
/// bumps, and a status change smuggled in through this path goes through the
/// same notify-on-change rule as the dedicated transition.
pub async fn edit_fields(
    state: &AppState,
    user: &User,
    id: Uuid,
    req: UpdateJobRequest,
) -> Result<Job, ApiError> {
    let (patch, new_status) = validate_update(req)?;

    let existing = repo::find_active_by_id(&state.db, user.id, id)
        .await?
        .ok_or_else(job_not_found)?;

    if let Some(job_id) = &patch.job_id {
        if *job_id != existing.job_id
            && repo::external_id_taken(&state.db, user.id, job_id, Some(existing.id)).await?
        {
            return Err(ApiError::Conflict(
                "A job application with this Job ID already exists".into(),
            ));
        }
    }

    let old_status = existing.status;
    let job = repo::update_fields(&state.db, existing.id, patch)
        .await?
        .ok_or_else(job_not_found)?;

    if let Some(new_status) = new_status {
        if new_status != old_status {
            if let Err(e) = state
                .notifier
                .notify_status_change(&user.email, &user.name, &job, old_status, new_status)
                .await
                .map_err(|e| ApiError::Notify(e.to_string()))
            {
                warn!(error = %e, job_id = %job.job_id, "status-change email failed");
            }
        }
    }

    Ok(job)
}

pub async fn delete_job(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
    let deleted = repo::soft_delete(&state.db, user_id, id).await?;
    if deleted {
        Ok(())
    } else {
        Err(job_not_found())
    }
}

fn job_not_found() -> ApiError {
    ApiError::NotFound("Job application not found".into())
}

fn validate_len(
    value: &str,
    max: usize,
    message: &str,
) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::Validation(message.into()));
    }
    Ok(())
}

fn validate_opt_len(
    value: &Option<String>,
    max: usize,
    message: &str,
) -> Result<(), ApiError> {
    match value {
        Some(v) => validate_len(v, max, message),
        None => Ok(()),
    }
}

fn validate_round(round: Option<i32>) -> Result<(), ApiError> {
    if matches!(round, Some(r) if r < 1) {
        return Err(ApiError::Validation(
            "Round number must be at least 1".into(),
        ));
    }
    Ok(())
}

fn validate_excitement(index: Option<i32>) -> Result<(), ApiError> {
    if matches!(index, Some(i) if !(1..=5).contains(&i)) {
        return Err(ApiError::Validation(
            "Excitement index must be between 1 and 5".into(),
        ));
    }
    Ok(())
}

/// Rejects a malformed create request before anything is written and folds
/// defaults in, returning the insert payload.
pub(crate) fn validate_create(req: CreateJobRequest) -> Result<NewJob, ApiError> {
    let job_id = req.job_id.trim().to_string();
    if job_id.is_empty() || job_id.chars().count() > 100 {
        return Err(ApiError::Validation(
            "Job ID is required and must be less than 100 characters".into(),
        ));
    }

    let company_name = req.company_name.trim().to_string();
    if company_name.is_empty() || company_name.chars().count() > 200 {
        return Err(ApiError::Validation(
            "Company name is required and must be less than 200 characters".into(),
        ));
    }

    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Please enter a valid email".into()));
    }

    let status = match req.status.as_deref() {
        Some(s) => s.parse::<JobStatus>().map_err(ApiError::Validation)?,
        None => JobStatus::Applied,
    };

    validate_round(req.round_number)?;
    validate_excitement(req.excitement_index)?;
    validate_opt_len(&req.position, 200, "Position must be less than 200 characters")?;
    validate_opt_len(&req.location, 200, "Location must be less than 200 characters")?;
    validate_opt_len(&req.salary, 100, "Salary must be less than 100 characters")?;
    validate_opt_len(&req.notes, 1000, "Notes must be less than 1000 characters")?;
    validate_opt_len(
        &req.job_description,
        2000,
        "Job description must be less than 2000 characters",
    )?;
    validate_opt_len(&req.resume, 500, "Resume name must be less than 500 characters")?;

    Ok(NewJob {
        job_id,
        company_name,
        email,
        status,
        round_number: req.round_number.unwrap_or(1),
        position: req.position,
        location: req.location,
        salary: req.salary,
        notes: req.notes,
        job_description: req.job_description,
        resume: req.resume,
        excitement_index: req.excitement_index.unwrap_or(3),
        application_date: req.application_date,
        next_follow_up: req.next_follow_up,
    })
}

/// Rejects a malformed edit before anything is written; returns the column
/// patch plus the parsed status, if one was supplied.
pub(crate) fn validate_update(
    req: UpdateJobRequest,
) -> Result<(JobPatch, Option<JobStatus>), ApiError> {
    let job_id = match req.job_id {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() || trimmed.chars().count() > 100 {
                return Err(ApiError::Validation(
                    "Job ID is required and must be less than 100 characters".into(),
                ));
            }
            Some(trimmed)
        }
        None => None,
    };

    let company_name = match req.company_name {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() || trimmed.chars().count() > 200 {
                return Err(ApiError::Validation(
                    "Company name is required and must be less than 200 characters".into(),
                ));
            }
            Some(trimmed)
        }
        None => None,
    };

    let email = match req.email {
        Some(raw) => {
            let normalized = raw.trim().to_lowercase();
            if !is_valid_email(&normalized) {
                return Err(ApiError::Validation("Please enter a valid email".into()));
            }
            Some(normalized)
        }
        None => None,
    };

    let status = match req.status.as_deref() {
        Some(s) => Some(s.parse::<JobStatus>().map_err(ApiError::Validation)?),
        None => None,
    };

    validate_round(req.round_number)?;
    validate_excitement(req.excitement_index)?;
    validate_opt_len(&req.position, 200, "Position must be less than 200 characters")?;
    validate_opt_len(&req.location, 200, "Location must be less than 200 characters")?;
    validate_opt_len(&req.salary, 100, "Salary must be less than 100 characters")?;
    validate_opt_len(&req.notes, 1000, "Notes must be less than 1000 characters")?;
    validate_opt_len(
        &req.job_description,
        2000,
        "Job description must be less than 2000 characters",
    )?;
    validate_opt_len(&req.resume, 500, "Resume name must be less than 500 characters")?;

    let patch = JobPatch {
        job_id,
        company_name,
        email,
        status,
        round_number: req.round_number,
        position: req.position,
        location: req.location,
        salary: req.salary,
        notes: req.notes,
        job_description: req.job_description,
        resume: req.resume,
        excitement_index: req.excitement_index,
        next_follow_up: req.next_follow_up,
    };
    Ok((patch, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateJobRequest {
        CreateJobRequest {
            job_id: "ENG-42".into(),
            company_name: "Acme".into(),
            email: "recruiting@acme.test".into(),
            status: None,
            round_number: None,
            position: None,
            location: None,
            salary: None,
            notes: None,
            job_description: None,
            resume: None,
            excitement_index: None,
            application_date: None,
            next_follow_up: None,
        }
    }

    #[test]
    fn create_defaults_to_applied_round_one_excitement_three() {
        let new = validate_create(create_request()).unwrap();
        assert_eq!(new.status, JobStatus::Applied);
        assert_eq!(new.round_number, 1);
        assert_eq!(new.excitement_index, 3);
    }

    #[test]
    fn create_normalizes_email_and_trims_ids() {
        let mut req = create_request();
        req.job_id = "  ENG-42  ".into();
        req.email = "Recruiting@Acme.Test".into();
        let new = validate_create(req).unwrap();
        assert_eq!(new.job_id, "ENG-42");
        assert_eq!(new.email, "recruiting@acme.test");
    }

    #[test]
    fn create_rejects_unknown_status() {
        let mut req = create_request();
        req.status = Some("ghosted".into());
        let err = validate_create(req).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn create_rejects_round_below_one() {
        let mut req = create_request();
        req.round_number = Some(0);
        let err = validate_create(req).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m.contains("Round number")));
    }

    #[test]
    fn create_rejects_excitement_outside_range() {
        let mut req = create_request();
        req.excitement_index = Some(6);
        assert!(validate_create(req).is_err());
    }

    #[test]
    fn create_rejects_overlong_notes() {
        let mut req = create_request();
        req.notes = Some("x".repeat(1001));
        let err = validate_create(req).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m.contains("Notes")));
    }

    #[test]
    fn update_with_only_location_touches_nothing_else() {
        let req = UpdateJobRequest {
            location: Some("Berlin".into()),
            ..Default::default()
        };
        let (patch, status) = validate_update(req).unwrap();
        assert_eq!(patch.location.as_deref(), Some("Berlin"));
        assert!(status.is_none());
        assert!(patch.job_id.is_none());
        assert!(patch.round_number.is_none());
        assert!(patch.status.is_none());
        assert!(patch.next_follow_up.is_none());
    }

    #[test]
    fn update_parses_status_for_the_notify_rule() {
        let req = UpdateJobRequest {
            status: Some("offer".into()),
            ..Default::default()
        };
        let (patch, status) = validate_update(req).unwrap();
        assert_eq!(status, Some(JobStatus::Offer));
        assert_eq!(patch.status, Some(JobStatus::Offer));
    }

    #[test]
    fn update_keeps_the_clear_marker_for_follow_up() {
        let req = UpdateJobRequest {
            next_follow_up: Some(None),
            ..Default::default()
        };
        let (patch, _) = validate_update(req).unwrap();
        assert_eq!(patch.next_follow_up, Some(None));
    }

    #[test]
    fn update_rejects_empty_job_id() {
        let req = UpdateJobRequest {
            job_id: Some("   ".into()),
            ..Default::default()
        };
        assert!(validate_update(req).is_err());
    }
}
