use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::jobs::repo::{Job, JobStats};

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub job_id: String,
    pub company_name: String,
    pub email: String,
    /// Wire status name; defaults to "applied" when omitted.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub round_number: Option<i32>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub notes: Option<String>,
    pub job_description: Option<String>,
    pub resume: Option<String>,
    #[serde(default)]
    pub excitement_index: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub application_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub next_follow_up: Option<OffsetDateTime>,
}

/// General edit: a field that is absent stays untouched. `next_follow_up`
/// distinguishes absent (keep) from null (clear).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub job_id: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub round_number: Option<i32>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub notes: Option<String>,
    pub job_description: Option<String>,
    pub resume: Option<String>,
    pub excitement_index: Option<i32>,
    #[serde(default, deserialize_with = "present_or_absent")]
    pub next_follow_up: Option<Option<OffsetDateTime>>,
}

fn present_or_absent<'de, D>(deserializer: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
    #[serde(default)]
    pub round_number: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_jobs: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<Job>,
    pub pagination: PaginationMeta,
    pub stats: JobStats,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: JobStats,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub message: String,
    pub job: Job,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_follow_up_is_keep_and_null_is_clear() {
        let keep: UpdateJobRequest = serde_json::from_str(r#"{"location": "Berlin"}"#).unwrap();
        assert_eq!(keep.next_follow_up, None);

        let clear: UpdateJobRequest = serde_json::from_str(r#"{"next_follow_up": null}"#).unwrap();
        assert_eq!(clear.next_follow_up, Some(None));

        let set: UpdateJobRequest =
            serde_json::from_str(r#"{"next_follow_up": "2026-03-05T10:00:00Z"}"#).unwrap();
        assert!(matches!(set.next_follow_up, Some(Some(_))));
    }

    #[test]
    fn list_query_defaults_to_first_page_of_ten() {
        let query: ListJobsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert!(query.status.is_none());
        assert!(query.search.is_none());
    }
}
