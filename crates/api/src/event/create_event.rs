use super::subscribers::{ScheduleReminderOnEventCreated, SendInvitationOnEventCreated};
use crate::shared::usecase::{Subscriber, UseCase};
use reminders_domain::{CalendarEvent, EmailAddress, ID};
use reminders_infra::ReminderContext;
use thiserror::Error;

#[derive(Debug)]
pub struct CreateEventUseCase {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_ts: i64,
    pub participants: Vec<String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum UseCaseError {
    #[error("participant {0} should be a valid email")]
    InvalidParticipant(String),
    #[error("Unable to store the calendar event")]
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = CalendarEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateEvent";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let mut participants = Vec::with_capacity(self.participants.len());
        for participant in &self.participants {
            let address = EmailAddress::parse(participant)
                .map_err(|_| UseCaseError::InvalidParticipant(participant.clone()))?;
            participants.push(String::from(address));
        }

        let now = ctx.sys.get_timestamp_millis();
        let e = CalendarEvent {
            id: ID::new(),
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start_ts: self.start_ts,
            participants,
            created: now,
            updated: now,
        };

        ctx.repos
            .events
            .insert(&e)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(e)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(ScheduleReminderOnEventCreated),
            Box::new(SendInvitationOnEventCreated),
        ]
    }
}
