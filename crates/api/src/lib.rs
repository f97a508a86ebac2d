mod event;
mod shared;

pub use event::*;
use reminders_infra::ReminderContext;
pub use shared::usecase::{execute, Subscriber, UseCase};
use tracing::error;

pub struct Application {
    context: ReminderContext,
}

impl Application {
    /// Takes over the given context and brings back the reminders of all
    /// upcoming events, since scheduled jobs do not survive a restart.
    pub async fn new(context: ReminderContext) -> Self {
        Application::start_reminders(&context).await;

        Self { context }
    }

    pub fn context(&self) -> &ReminderContext {
        &self.context
    }

    async fn start_reminders(context: &ReminderContext) {
        if let Err(e) = execute(RestoreRemindersUseCase, context).await {
            error!("Unable to restore reminders on startup: {}", e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use reminders_domain::{CalendarEvent, ID};

    #[tokio::test]
    async fn restores_reminders_on_startup() {
        let ctx = ReminderContext::create_inmemory();
        let e = CalendarEvent {
            id: ID::new(),
            title: "Planning".into(),
            description: String::new(),
            location: String::new(),
            start_ts: ctx.sys.get_timestamp_millis() + 1000 * 60 * 60 * 5,
            participants: vec!["p@example.com".into()],
            created: 0,
            updated: 0,
        };
        ctx.repos.events.insert(&e).await.unwrap();

        let app = Application::new(ctx).await;

        assert!(app.context().reminders.pending_job(&e.id).is_some());
    }
}
