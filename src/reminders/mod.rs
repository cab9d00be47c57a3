pub mod handlers;
pub mod scanner;
pub mod scheduler;

pub use scheduler::ReminderScheduler;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
