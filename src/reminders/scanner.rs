use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::jobs::repo;
use crate::state::AppState;

/// Result of one deadline scan. `count` is the number of matches found, not
/// the number of reminder emails that went out.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub success: bool,
    pub count: usize,
    pub error: Option<String>,
}

/// The matching window: one hour centered on exactly 24 hours ahead, wide
/// enough to tolerate scan-interval jitter. Lower bound inclusive, upper
/// bound exclusive. There is no persisted "already notified" marker, so two
/// scans inside the same window will remind twice.
pub fn window_bounds(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let center = now + Duration::hours(24);
    (
        center - Duration::minutes(30),
        center + Duration::minutes(30),
    )
}

/// Run one scan unless another is already in flight, in which case the
/// trigger is skipped (scans never overlap).
pub async fn run_scan_once(state: &AppState) -> ScanOutcome {
    let Ok(_guard) = state.scan_lock.try_lock() else {
        warn!("deadline scan already running; skipping this trigger");
        return ScanOutcome {
            success: false,
            count: 0,
            error: Some("a deadline scan is already running".into()),
        };
    };
    scan(state, OffsetDateTime::now_utc()).await
}

async fn scan(state: &AppState, now: OffsetDateTime) -> ScanOutcome {
    let (start, end) = window_bounds(now);
    info!(start = %start, end = %end, "checking for follow-ups due in about 24 hours");

    let due = match repo::due_follow_ups(&state.db, start, end).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "deadline scan query failed");
            return ScanOutcome {
                success: false,
                count: 0,
                error: Some(e.to_string()),
            };
        }
    };

    let count = due.len();
    info!(count, "follow-ups found in the reminder window");

    for entry in due {
        let (Some(email), Some(name)) = (entry.owner_email.as_deref(), entry.owner_name.as_deref())
        else {
            debug!(job_id = %entry.job.job_id, "owner contact missing; skipping reminder");
            continue;
        };
        // One failed delivery must not abort the remaining matches.
        match state.notifier.notify_reminder(email, name, &entry.job).await {
            Ok(()) => {
                info!(job_id = %entry.job.job_id, company = %entry.job.company_name, to = %email,
                      "reminder sent")
            }
            Err(e) => {
                warn!(error = %e, job_id = %entry.job.job_id, "reminder email failed")
            }
        }
    }

    ScanOutcome {
        success: true,
        count,
        error: None,
    }
}
