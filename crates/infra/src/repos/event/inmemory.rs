use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use reminders_domain::{CalendarEvent, ID};

pub struct InMemoryEventRepo {
    calendar_events: std::sync::Mutex<Vec<CalendarEvent>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            calendar_events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryEventRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_by_start(mut events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    events.sort_by_key(|e| e.start_ts);
    events
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, e: &CalendarEvent) -> anyhow::Result<()> {
        insert(e, &self.calendar_events);
        Ok(())
    }

    async fn save(&self, e: &CalendarEvent) -> anyhow::Result<()> {
        if save(e, &self.calendar_events) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Calendar event {} does not exist", e.id))
        }
    }

    async fn find(&self, event_id: &ID) -> Option<CalendarEvent> {
        find(event_id, &self.calendar_events)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<CalendarEvent>> {
        Ok(sorted_by_start(find_by(&self.calendar_events, |_| true)))
    }

    async fn find_starting_after(&self, ts: i64) -> anyhow::Result<Vec<CalendarEvent>> {
        Ok(sorted_by_start(find_by(&self.calendar_events, |e| {
            e.start_ts > ts
        })))
    }

    async fn delete(&self, event_id: &ID) -> Option<CalendarEvent> {
        delete(event_id, &self.calendar_events)
    }
}
