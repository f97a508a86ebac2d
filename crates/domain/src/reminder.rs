use crate::shared::entity::ID;
use chrono::Duration;

/// Computes the timestamp (unix millis) at which the reminder for an event
/// starting at `start_ts` should fire.
///
/// No timezone conversion happens, the result is in the same frame as `start_ts`.
/// The result may lie in the past, deciding what to do about that is up to the caller.
pub fn fire_time(start_ts: i64, lead_interval: Duration) -> i64 {
    start_ts.saturating_sub(lead_interval.num_milliseconds())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Fired,
    Cancelled,
}

/// A `ScheduledJob` is the pending reminder of a `CalendarEvent`.
/// At most one pending job exists per event at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledJob {
    /// Identifier of this job, unique across the lifetime of the process
    pub job_id: u64,
    /// The `CalendarEvent` this job reminds about
    pub event_id: ID,
    /// The timestamp at which the job fires
    pub fire_ts: i64,
    pub status: JobStatus,
}

/// Why a notification is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Sent once when the event is created
    Invitation,
    /// Sent one lead interval before the event starts
    Reminder,
}

impl NotificationKind {
    pub fn subject(&self, title: &str) -> String {
        match self {
            Self::Invitation => format!("Invitation: {}", title),
            Self::Reminder => format!("Reminder: {}", title),
        }
    }
}
