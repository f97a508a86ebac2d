mod delivery;
mod email;
mod event;
mod reminder;
mod shared;

pub use delivery::{DeliveryFailure, DeliveryOutcome};
pub use email::{EmailAddress, InvalidEmailError};
pub use event::CalendarEvent;
pub use reminder::{fire_time, JobStatus, NotificationKind, ScheduledJob};
pub use shared::entity::{Entity, InvalidIDError, ID};
