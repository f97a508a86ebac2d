use super::subscribers::RescheduleReminderOnEventUpdated;
use crate::shared::usecase::{Subscriber, UseCase};
use reminders_domain::{CalendarEvent, EmailAddress, ID};
use reminders_infra::ReminderContext;
use thiserror::Error;

/// Updates the given fields of a `CalendarEvent`.
///
/// Participants are added to the existing ones, already invited
/// participants are ignored.
#[derive(Debug, Default)]
pub struct UpdateEventUseCase {
    pub event_id: ID,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_ts: Option<i64>,
    pub participants: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatedEvent {
    pub event: CalendarEvent,
    /// The start time or participants changed, so the reminder has to follow
    pub reminder_affected: bool,
}

#[derive(Error, Debug, PartialEq)]
pub enum UseCaseError {
    #[error("The calendar event with id: {0}, was not found.")]
    NotFound(ID),
    #[error("participant {0} should be a valid email")]
    InvalidParticipant(String),
    #[error("Unable to store the calendar event")]
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventUseCase {
    type Response = UpdatedEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateEvent";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let UpdateEventUseCase {
            event_id,
            title,
            description,
            location,
            start_ts,
            participants,
        } = self;

        let mut e = match ctx.repos.events.find(event_id).await {
            Some(event) => event,
            None => return Err(UseCaseError::NotFound(*event_id)),
        };

        let mut reminder_affected = false;

        if let Some(participants) = participants {
            let mut new_participants = Vec::with_capacity(participants.len());
            for participant in participants.iter() {
                let address = EmailAddress::parse(participant)
                    .map_err(|_| UseCaseError::InvalidParticipant(participant.clone()))?;
                new_participants.push(String::from(address));
            }
            if e.add_participants(&new_participants) {
                reminder_affected = true;
            }
        }
        if let Some(start_ts) = start_ts {
            if e.start_ts != *start_ts {
                e.start_ts = *start_ts;
                reminder_affected = true;
            }
        }
        if let Some(title) = title {
            e.title = title.clone();
        }
        if let Some(description) = description {
            e.description = description.clone();
        }
        if let Some(location) = location {
            e.location = location.clone();
        }
        e.updated = ctx.sys.get_timestamp_millis();

        ctx.repos
            .events
            .save(&e)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(UpdatedEvent {
            event: e,
            reminder_affected,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(RescheduleReminderOnEventUpdated)]
    }
}
