use crate::shared::usecase::UseCase;
use reminders_infra::ReminderContext;
use thiserror::Error;
use tracing::info;

/// Schedules the reminders of all stored events that have not started yet.
/// Run once at startup since scheduled jobs only live in memory.
#[derive(Debug)]
pub struct RestoreRemindersUseCase;

#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("Unable to read the calendar events")]
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for RestoreRemindersUseCase {
    /// Number of reminders scheduled
    type Response = usize;

    type Error = UseCaseError;

    const NAME: &'static str = "RestoreReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let events = ctx
            .repos
            .events
            .find_starting_after(now)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let scheduled = events
            .iter()
            .filter_map(|e| ctx.reminders.schedule_for_event(e))
            .count();
        info!(
            "Restored {} reminders for {} upcoming events",
            scheduled,
            events.len()
        );

        Ok(scheduled)
    }
}
