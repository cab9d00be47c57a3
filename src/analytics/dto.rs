use serde::Serialize;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::jobs::status::JobStatus;

#[derive(Debug, Serialize)]
pub struct Kpis {
    pub total_applications: usize,
    pub interviews_scheduled: usize,
    pub offers_received: usize,
    /// Offers per hundred applications, rounded to one decimal place.
    pub conversion_ratio: f64,
    pub upcoming_deadlines: usize,
}

/// Chart-ready groupings: category key -> count. BTreeMap keeps the key order
/// deterministic for clients and tests alike.
#[derive(Debug, Serialize)]
pub struct Charts {
    pub status_breakdown: BTreeMap<String, u64>,
    pub applications_over_time: BTreeMap<String, u64>,
    pub job_type_distribution: BTreeMap<String, u64>,
    pub monthly_trends: BTreeMap<String, u64>,
    pub excitement_distribution: BTreeMap<i32, u64>,
}

#[derive(Debug, Serialize)]
pub struct DeadlineEntry {
    pub id: Uuid,
    pub job_id: String,
    pub company_name: String,
    pub position: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub next_follow_up: OffsetDateTime,
    pub status: JobStatus,
    pub days_until: i64,
}

#[derive(Debug, Serialize)]
pub struct Insights {
    pub suggested_focus_areas: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub kpis: Kpis,
    pub charts: Charts,
    pub deadlines: Vec<DeadlineEntry>,
    pub insights: Insights,
}
