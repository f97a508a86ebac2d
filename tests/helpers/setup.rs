use reminders_api::Application;
use reminders_infra::{InMemoryMailTransport, ReminderContext, TokioTimeSys};
use std::sync::Arc;

/// 2021-06-01 12:00:00 UTC
pub const NOW: i64 = 1_622_548_800_000;
pub const MINUTE: i64 = 1000 * 60;

pub struct TestApp {
    pub app: Application,
    pub mailbox: Arc<InMemoryMailTransport>,
}

impl TestApp {
    pub fn ctx(&self) -> &ReminderContext {
        self.app.context()
    }
}

pub fn test_context(mailbox: Arc<InMemoryMailTransport>) -> ReminderContext {
    ReminderContext::create_inmemory_with(mailbox, Arc::new(TokioTimeSys::new(NOW)))
}

/// Builds the application on top of a clock that starts at `NOW` and only
/// moves with Tokio's clock. Meant for tests with paused time.
pub async fn spawn_app() -> TestApp {
    let mailbox = Arc::new(InMemoryMailTransport::new());
    let app = Application::new(test_context(mailbox.clone())).await;

    TestApp { app, mailbox }
}
