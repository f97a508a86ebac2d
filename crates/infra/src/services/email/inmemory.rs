use super::{IMailTransport, MailMessage, TransportError};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

#[derive(Default)]
struct Mailbox {
    sent: Vec<MailMessage>,
    failures: HashMap<String, TransportError>,
    delays: HashMap<String, Duration>,
    attempts: usize,
}

/// Mail transport that keeps every message in memory.
/// Used by tests and for running the service without a mail relay.
#[derive(Default)]
pub struct InMemoryMailTransport {
    mailbox: Mutex<Mailbox>,
    latency: Option<Duration>,
}

impl InMemoryMailTransport {
    pub fn new() -> Self {
        Default::default()
    }

    /// Every send waits for `latency` before it completes
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Default::default()
        }
    }

    fn mailbox(&self) -> MutexGuard<'_, Mailbox> {
        self.mailbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sending to `address` fails with `error` from now on
    pub fn fail_for(&self, address: &str, error: TransportError) {
        self.mailbox().failures.insert(address.to_string(), error);
    }

    /// Sending to `address` takes `latency` instead of the default latency
    pub fn delay_for(&self, address: &str, latency: Duration) {
        self.mailbox().delays.insert(address.to_string(), latency);
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.mailbox().sent.clone()
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.mailbox()
            .sent
            .iter()
            .map(|m| m.to.as_str().to_string())
            .collect()
    }

    /// Number of send attempts, failed ones included
    pub fn attempts(&self) -> usize {
        self.mailbox().attempts
    }
}

#[async_trait::async_trait]
impl IMailTransport for InMemoryMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        let latency = {
            let mut mailbox = self.mailbox();
            mailbox.attempts += 1;
            mailbox
                .delays
                .get(message.to.as_str())
                .copied()
                .or(self.latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let mut mailbox = self.mailbox();
        if let Some(error) = mailbox.failures.get(message.to.as_str()) {
            return Err(error.clone());
        }
        mailbox.sent.push(message.clone());
        Ok(())
    }
}
