use std::sync::Mutex;
use time::{Duration, OffsetDateTime, Time};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::reminders::scanner;
use crate::state::AppState;

/// Long-lived daily trigger for the deadline scan, owned by the composition
/// root. Scheduling state lives here, not in a module-level global, so tests
/// can drive the scan without wall-clock coupling.
pub struct ReminderScheduler {
    state: AppState,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            handle: Mutex::new(None),
        }
    }

    /// Spawn the daily loop; a second call while running is a no-op.
    pub fn start(&self) {
        let mut slot = self.handle.lock().expect("scheduler handle lock");
        if slot.is_some() {
            return;
        }

        let state = self.state.clone();
        let run_at = state.config.reminders.run_at;
        *slot = Some(tokio::spawn(async move {
            loop {
                let now = OffsetDateTime::now_utc();
                let next = next_run_after(now, run_at);
                info!(next_run = %next, "next scheduled deadline scan");
                tokio::time::sleep((next - now).unsigned_abs()).await;

                let outcome = scanner::run_scan_once(&state).await;
                if outcome.success {
                    info!(count = outcome.count, "scheduled deadline scan finished");
                } else {
                    warn!(error = ?outcome.error, "scheduled deadline scan failed");
                }
            }
        }));
        info!("deadline notification scheduler initialized");
    }

    pub fn stop(&self) {
        if let Some(handle) = self
            .handle
            .lock()
            .expect("scheduler handle lock")
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Next occurrence of the configured time of day strictly after `now`.
pub(crate) fn next_run_after(now: OffsetDateTime, run_at: Time) -> OffsetDateTime {
    let today = now.replace_time(run_at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}
