mod config;
mod reminders;
mod repos;
mod services;
mod system;

pub use config::{Config, SmtpConfig};
pub use reminders::{CancelOutcome, JobCallback, JobHandle, JobRunner, ReminderScheduler};
pub use repos::{IEventRepo, InMemoryEventRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, RealSys, TokioTimeSys};

/// Everything the use cases need, created once at process startup
#[derive(Clone)]
pub struct ReminderContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub reminders: ReminderScheduler,
}

impl ReminderContext {
    pub fn create(
        repos: Repos,
        config: Config,
        sys: Arc<dyn ISys>,
        notifier: Arc<dyn INotifier>,
    ) -> Self {
        let reminders = ReminderScheduler::new(notifier, sys.clone(), config.lead_interval);
        Self {
            repos,
            config,
            sys,
            reminders,
        }
    }

    /// Context without any outside dependencies. Notifications end up in an
    /// `InMemoryMailTransport` instead of a mail relay.
    pub fn create_inmemory() -> Self {
        Self::create_inmemory_with(Arc::new(InMemoryMailTransport::new()), Arc::new(RealSys {}))
    }

    pub fn create_inmemory_with(transport: Arc<InMemoryMailTransport>, sys: Arc<dyn ISys>) -> Self {
        let config = Config::new();
        let notifier = EmailNotifier::new(transport, config.smtp.sender.clone())
            .with_send_timeout(config.delivery_timeout);
        Self::create(Repos::create_inmemory(), config, sys, Arc::new(notifier))
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> anyhow::Result<ReminderContext> {
    let config = Config::new();
    let transport = SmtpMailTransport::new(&config.smtp)?;
    let notifier = EmailNotifier::new(Arc::new(transport), config.smtp.sender.clone())
        .with_send_timeout(config.delivery_timeout);

    Ok(ReminderContext::create(
        Repos::create_inmemory(),
        config,
        Arc::new(RealSys {}),
        Arc::new(notifier),
    ))
}
