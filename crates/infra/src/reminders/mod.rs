mod registry;
mod runner;
mod scheduler;

pub use runner::{CancelOutcome, JobCallback, JobHandle, JobRunner};
pub use scheduler::ReminderScheduler;
