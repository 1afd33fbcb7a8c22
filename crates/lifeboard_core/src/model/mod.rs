//! Domain model for dashboard, task, goal and journal data.
//!
//! # Responsibility
//! - Define canonical records used by services, stores and views.
//! - Keep identity and lifecycle helpers next to the data they guard.
//!
//! # Invariants
//! - Every record is identified by a stable v4 `Uuid`.
//! - Every user-owned record carries its owner `user_id`.
//! - Timestamps are Unix epoch milliseconds; calendar dates are `NaiveDate`.

pub mod dependency;
pub mod goal;
pub mod journal;
pub mod profile;
pub mod recurrence;
pub mod task;
pub mod widget;

pub use goal::GoalId;

use uuid::Uuid;

/// Identity assigned by the authentication provider.
pub type UserId = Uuid;

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC calendar date.
pub fn today_utc() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
