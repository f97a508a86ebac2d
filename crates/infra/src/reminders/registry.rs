use super::runner::JobHandle;
use reminders_domain::{JobStatus, ID};
use std::collections::HashMap;

/// What is currently scheduled: the handle of the live job of every event.
///
/// Deliberately not iterable, only the `ReminderScheduler` touches it.
#[derive(Debug, Default)]
pub(crate) struct JobRegistry {
    jobs: HashMap<ID, JobHandle>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Stores the handle and hands back the one it replaced, which the caller has to cancel
    pub fn put(&mut self, event_id: ID, handle: JobHandle) -> Option<JobHandle> {
        self.jobs.insert(event_id, handle)
    }

    pub fn remove(&mut self, event_id: &ID) -> Option<JobHandle> {
        self.jobs.remove(event_id)
    }

    pub fn get(&self, event_id: &ID) -> Option<&JobHandle> {
        self.jobs.get(event_id)
    }

    /// Removes the entry of `event_id` only if it still belongs to `job_id`.
    /// A job that already got superseded leaves its successor alone.
    pub fn remove_job(&mut self, event_id: &ID, job_id: u64) -> Option<JobHandle> {
        match self.jobs.get(event_id) {
            Some(handle) if handle.job_id() == job_id => self.jobs.remove(event_id),
            _ => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.jobs
            .values()
            .filter(|handle| handle.status() == JobStatus::Pending)
            .count()
    }
}
