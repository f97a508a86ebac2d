mod inmemory;

pub use inmemory::InMemoryEventRepo;
use reminders_domain::{CalendarEvent, ID};

/// Storage of `CalendarEvent`s. The event store commits here before it
/// tells the reminder scheduler about a change.
#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, e: &CalendarEvent) -> anyhow::Result<()>;
    async fn save(&self, e: &CalendarEvent) -> anyhow::Result<()>;
    async fn find(&self, event_id: &ID) -> Option<CalendarEvent>;
    /// All events, ordered by their start time
    async fn find_all(&self) -> anyhow::Result<Vec<CalendarEvent>>;
    /// Events that start after the given timestamp, ordered by their start time
    async fn find_starting_after(&self, ts: i64) -> anyhow::Result<Vec<CalendarEvent>>;
    async fn delete(&self, event_id: &ID) -> Option<CalendarEvent>;
}
