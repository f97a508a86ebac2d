use super::subscribers::CancelReminderOnEventDeleted;
use crate::shared::usecase::{Subscriber, UseCase};
use reminders_domain::{CalendarEvent, ID};
use reminders_infra::ReminderContext;
use thiserror::Error;

#[derive(Debug)]
pub struct DeleteEventUseCase {
    pub event_id: ID,
}

#[derive(Error, Debug, PartialEq)]
pub enum UseCaseError {
    #[error("The calendar event with id: {0}, was not found.")]
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteEventUseCase {
    type Response = CalendarEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteEvent";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .events
            .delete(&self.event_id)
            .await
            .ok_or(UseCaseError::NotFound(self.event_id))
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(CancelReminderOnEventDeleted)]
    }
}
