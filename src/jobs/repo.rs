use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::jobs::status::JobStatus;

/// Soft delete is a filter, not a state machine: every query in this module
/// goes through this fragment so an inactive row is invisible everywhere.
const ACTIVE: &str = "is_active = TRUE";

const JOB_COLUMNS: &str = r#"id, user_id, job_id, company_name, email, status, round_number,
       "position", location, salary, notes, job_description, resume,
       excitement_index, application_date, last_updated, next_follow_up,
       is_active, created_at"#;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub user_id: Uuid,
    /// User-chosen external identifier, unique per user among active rows.
    pub job_id: String,
    pub company_name: String,
    pub email: String,
    pub status: JobStatus,
    pub round_number: i32,
    pub position: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub notes: Option<String>,
    pub job_description: Option<String>,
    pub resume: Option<String>,
    pub excitement_index: i32,
    pub application_date: OffsetDateTime,
    pub last_updated: OffsetDateTime,
    pub next_follow_up: Option<OffsetDateTime>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

/// Insert payload; validation happens in the service layer before this exists.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub job_id: String,
    pub company_name: String,
    pub email: String,
    pub status: JobStatus,
    pub round_number: i32,
    pub position: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub notes: Option<String>,
    pub job_description: Option<String>,
    pub resume: Option<String>,
    pub excitement_index: i32,
    pub application_date: Option<OffsetDateTime>,
    pub next_follow_up: Option<OffsetDateTime>,
}

/// Field-level partial update. `None` leaves a column untouched; for
/// `next_follow_up` the outer option is "was the field present" and the inner
/// one distinguishes set from clear.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub job_id: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub status: Option<JobStatus>,
    pub round_number: Option<i32>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub notes: Option<String>,
    pub job_description: Option<String>,
    pub resume: Option<String>,
    pub excitement_index: Option<i32>,
    pub next_follow_up: Option<Option<OffsetDateTime>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobStats {
    pub total_jobs: i64,
    pub applied: i64,
    pub in_progress: i64,
    pub offers: i64,
    pub accepted: i64,
    pub rejected: i64,
}

/// A reminder-eligible job joined with its owner's contact details. The owner
/// columns are nullable so a dangling user reference skips the match instead
/// of failing the scan.
#[derive(Debug, Clone, FromRow)]
pub struct DueReminder {
    #[sqlx(flatten)]
    pub job: Job,
    pub owner_email: Option<String>,
    pub owner_name: Option<String>,
}

pub async fn find_active_by_id(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<Job>> {
    let sql = format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND user_id = $2 AND {ACTIVE}"
    );
    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(job)
}

/// List a user's active jobs, newest activity first, with optional status and
/// company/job-id/position search filters.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    status: Option<JobStatus>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Job>> {
    let sql = format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs
        WHERE user_id = $1 AND {ACTIVE}
          AND ($2::job_status IS NULL OR status = $2)
          AND ($3::text IS NULL
               OR company_name ILIKE '%' || $3 || '%'
               OR job_id ILIKE '%' || $3 || '%'
               OR "position" ILIKE '%' || $3 || '%')
        ORDER BY last_updated DESC
        LIMIT $4 OFFSET $5
    "#
    );
    let rows = sqlx::query_as::<_, Job>(&sql)
        .bind(user_id)
        .bind(status)
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn count_active(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM jobs WHERE user_id = $1 AND {ACTIVE}");
    let count: i64 = sqlx::query_scalar(&sql).bind(user_id).fetch_one(db).await?;
    Ok(count)
}

pub async fn stats_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<JobStats> {
    let sql = format!(
        r#"
        SELECT
            COUNT(*) AS total_jobs,
            COUNT(*) FILTER (WHERE status = 'applied') AS applied,
            COUNT(*) FILTER (WHERE status IN
                ('screening', 'phone-interview', 'technical-interview',
                 'onsite-interview', 'final-interview')) AS in_progress,
            COUNT(*) FILTER (WHERE status = 'offer') AS offers,
            COUNT(*) FILTER (WHERE status = 'accepted') AS accepted,
            COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
        FROM jobs
        WHERE user_id = $1 AND {ACTIVE}
    "#
    );
    let stats = sqlx::query_as::<_, JobStats>(&sql)
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(stats)
}

/// True when another active job of the same user already carries this
/// external job id. `exclude` skips the row being edited.
pub async fn external_id_taken(
    db: &PgPool,
    user_id: Uuid,
    job_id: &str,
    exclude: Option<Uuid>,
) -> anyhow::Result<bool> {
    let sql = format!(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM jobs
            WHERE user_id = $1 AND job_id = $2 AND {ACTIVE}
              AND ($3::uuid IS NULL OR id <> $3)
        )
    "#
    );
    let taken: bool = sqlx::query_scalar(&sql)
        .bind(user_id)
        .bind(job_id)
        .bind(exclude)
        .fetch_one(db)
        .await?;
    Ok(taken)
}

pub async fn insert(db: &PgPool, user_id: Uuid, new: NewJob) -> anyhow::Result<Job> {
    let sql = format!(
        r#"
        INSERT INTO jobs (user_id, job_id, company_name, email, status, round_number,
                          "position", location, salary, notes, job_description, resume,
                          excitement_index, application_date, next_follow_up)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                COALESCE($14, now()), $15)
        RETURNING {JOB_COLUMNS}
    "#
    );
    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(user_id)
        .bind(new.job_id)
        .bind(new.company_name)
        .bind(new.email)
        .bind(new.status)
        .bind(new.round_number)
        .bind(new.position)
        .bind(new.location)
        .bind(new.salary)
        .bind(new.notes)
        .bind(new.job_description)
        .bind(new.resume)
        .bind(new.excitement_index)
        .bind(new.application_date)
        .bind(new.next_follow_up)
        .fetch_one(db)
        .await?;
    Ok(job)
}

/// Atomic status transition: status, optional round and the recency stamp
/// move in one statement. Round is left alone when no new round is given.
pub async fn update_status(
    db: &PgPool,
    id: Uuid,
    new_status: JobStatus,
    new_round: Option<i32>,
) -> anyhow::Result<Option<Job>> {
    let sql = format!(
        r#"
        UPDATE jobs
        SET status = $2,
            round_number = COALESCE($3, round_number),
            last_updated = now()
        WHERE id = $1 AND {ACTIVE}
        RETURNING {JOB_COLUMNS}
    "#
    );
    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .bind(new_status)
        .bind(new_round)
        .fetch_optional(db)
        .await?;
    Ok(job)
}

/// Single-statement partial update so concurrent edits to different fields of
/// the same job do not overwrite each other's columns.
pub async fn update_fields(db: &PgPool, id: Uuid, patch: JobPatch) -> anyhow::Result<Option<Job>> {
    let follow_up_present = patch.next_follow_up.is_some();
    let follow_up_value = patch.next_follow_up.flatten();
    let sql = format!(
        r#"
        UPDATE jobs
        SET job_id = COALESCE($2, job_id),
            company_name = COALESCE($3, company_name),
            email = COALESCE($4, email),
            status = COALESCE($5, status),
            round_number = COALESCE($6, round_number),
            "position" = COALESCE($7, "position"),
            location = COALESCE($8, location),
            salary = COALESCE($9, salary),
            notes = COALESCE($10, notes),
            job_description = COALESCE($11, job_description),
            resume = COALESCE($12, resume),
            excitement_index = COALESCE($13, excitement_index),
            next_follow_up = CASE WHEN $14 THEN $15 ELSE next_follow_up END,
            last_updated = now()
        WHERE id = $1 AND {ACTIVE}
        RETURNING {JOB_COLUMNS}
    "#
    );
    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .bind(patch.job_id)
        .bind(patch.company_name)
        .bind(patch.email)
        .bind(patch.status)
        .bind(patch.round_number)
        .bind(patch.position)
        .bind(patch.location)
        .bind(patch.salary)
        .bind(patch.notes)
        .bind(patch.job_description)
        .bind(patch.resume)
        .bind(patch.excitement_index)
        .bind(follow_up_present)
        .bind(follow_up_value)
        .fetch_optional(db)
        .await?;
    Ok(job)
}

pub async fn soft_delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let sql = format!(
        r#"
        UPDATE jobs
        SET is_active = FALSE, last_updated = now()
        WHERE id = $1 AND user_id = $2 AND {ACTIVE}
    "#
    );
    let result = sqlx::query(&sql).bind(id).bind(user_id).execute(db).await?;
    Ok(result.rows_affected() > 0)
}

/// Full active snapshot for analytics, application date descending so the
/// derived lists iterate deterministically.
pub async fn all_active_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Job>> {
    let sql = format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs
        WHERE user_id = $1 AND {ACTIVE}
        ORDER BY application_date DESC
    "#
    );
    let rows = sqlx::query_as::<_, Job>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Active jobs whose follow-up falls inside [start, end), joined with owner
/// contact details for the reminder email.
pub async fn due_follow_ups(
    db: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<Vec<DueReminder>> {
    let sql = format!(
        r#"
        SELECT j.id, j.user_id, j.job_id, j.company_name, j.email, j.status,
               j.round_number, j."position", j.location, j.salary, j.notes,
               j.job_description, j.resume, j.excitement_index,
               j.application_date, j.last_updated, j.next_follow_up,
               j.is_active, j.created_at,
               u.email AS owner_email, u.name AS owner_name
        FROM jobs j
        LEFT JOIN users u ON u.id = j.user_id
        WHERE j.{ACTIVE}
          AND j.next_follow_up >= $1
          AND j.next_follow_up < $2
    "#
    );
    let rows = sqlx::query_as::<_, DueReminder>(&sql)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
