use crate::shared::usecase::UseCase;
use reminders_domain::{CalendarEvent, ID};
use reminders_infra::ReminderContext;
use thiserror::Error;

#[derive(Debug)]
pub struct GetEventUseCase {
    pub event_id: ID,
}

#[derive(Error, Debug, PartialEq)]
pub enum UseCaseError {
    #[error("The calendar event with id: {0}, was not found.")]
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventUseCase {
    type Response = CalendarEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "GetEvent";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .events
            .find(&self.event_id)
            .await
            .ok_or(UseCaseError::NotFound(self.event_id))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn finds_stored_event() {
        let ctx = ReminderContext::create_inmemory();
        let e = CalendarEvent {
            id: ID::new(),
            title: "Review".into(),
            description: String::new(),
            location: String::new(),
            start_ts: 1000,
            participants: vec![],
            created: 0,
            updated: 0,
        };
        ctx.repos.events.insert(&e).await.unwrap();

        let mut usecase = GetEventUseCase { event_id: e.id };
        assert_eq!(usecase.execute(&ctx).await, Ok(e));

        let mut usecase = GetEventUseCase {
            event_id: ID::new(),
        };
        assert!(usecase.execute(&ctx).await.is_err());
    }
}
