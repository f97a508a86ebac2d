use crate::shared::usecase::UseCase;
use reminders_domain::CalendarEvent;
use reminders_infra::ReminderContext;
use thiserror::Error;

/// Lists every stored event, soonest start first
#[derive(Debug)]
pub struct GetEventsUseCase;

#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("Unable to read the calendar events")]
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventsUseCase {
    type Response = Vec<CalendarEvent>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetEvents";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .events
            .find_all()
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
