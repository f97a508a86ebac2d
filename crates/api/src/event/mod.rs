mod create_event;
mod delete_event;
mod get_event;
mod get_events;
mod restore_reminders;
mod subscribers;
mod update_event;

pub use create_event::CreateEventUseCase;
pub use delete_event::DeleteEventUseCase;
pub use get_event::GetEventUseCase;
pub use get_events::GetEventsUseCase;
pub use restore_reminders::RestoreRemindersUseCase;
pub use update_event::{UpdateEventUseCase, UpdatedEvent};

pub mod errors {
    pub use super::create_event::UseCaseError as CreateEventError;
    pub use super::delete_event::UseCaseError as DeleteEventError;
    pub use super::get_event::UseCaseError as GetEventError;
    pub use super::get_events::UseCaseError as GetEventsError;
    pub use super::restore_reminders::UseCaseError as RestoreRemindersError;
    pub use super::update_event::UseCaseError as UpdateEventError;
}
