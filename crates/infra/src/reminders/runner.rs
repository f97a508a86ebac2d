use crate::system::ISys;
use futures::future::BoxFuture;
use reminders_domain::JobStatus;
use std::{
    sync::{
        atomic::{AtomicU64, AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::debug;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Work to run once the job fires. Receives the id of the job that fired.
pub type JobCallback = Box<dyn FnOnce(u64) -> BoxFuture<'static, ()> + Send + 'static>;

/// Handle of a one-shot job scheduled on the `JobRunner`.
///
/// The state moves from pending to either fired or cancelled exactly once,
/// whichever side wins the compare-and-swap decides what happens to the job.
#[derive(Debug)]
pub struct JobHandle {
    job_id: u64,
    fire_ts: i64,
    state: Arc<AtomicU8>,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    pub fn fire_ts(&self) -> i64 {
        self.fire_ts
    }

    pub fn status(&self) -> JobStatus {
        match self.state.load(Ordering::Acquire) {
            PENDING => JobStatus::Pending,
            FIRED => JobStatus::Fired,
            _ => JobStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The job had not fired yet and never will
    Cancelled,
    /// The job already started firing, its callback runs to completion
    TooLate,
    AlreadyCancelled,
}

/// Runs one-shot callbacks at (or shortly after) their fire time.
///
/// Every job gets its own task, so jobs never wait on each other.
/// Must be used from within a Tokio runtime.
pub struct JobRunner {
    sys: Arc<dyn ISys>,
    next_job_id: AtomicU64,
}

impl JobRunner {
    pub fn new(sys: Arc<dyn ISys>) -> Self {
        Self {
            sys,
            next_job_id: AtomicU64::new(1),
        }
    }

    /// Schedules `callback` to run at `fire_ts`. A fire time in the past fires right away.
    pub fn schedule(&self, fire_ts: i64, callback: JobCallback) -> JobHandle {
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        let delay_millis = fire_ts
            .saturating_sub(self.sys.get_timestamp_millis())
            .max(0) as u64;
        let state = Arc::new(AtomicU8::new(PENDING));

        let task_state = state.clone();
        let task = tokio::spawn(async move {
            if delay_millis > 0 {
                tokio::time::sleep(Duration::from_millis(delay_millis)).await;
            }
            if task_state
                .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                debug!("Job {} fired", job_id);
                callback(job_id).await;
            }
        });

        JobHandle {
            job_id,
            fire_ts,
            state,
            task,
        }
    }

    pub fn cancel(&self, handle: &JobHandle) -> CancelOutcome {
        match handle.state.compare_exchange(
            PENDING,
            CANCELLED,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                // The callback has not started, so aborting only drops the timer
                handle.task.abort();
                CancelOutcome::Cancelled
            }
            Err(FIRED) => CancelOutcome::TooLate,
            Err(_) => CancelOutcome::AlreadyCancelled,
        }
    }
}
