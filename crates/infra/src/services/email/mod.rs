mod inmemory;
mod smtp;

pub use inmemory::InMemoryMailTransport;
pub use smtp::SmtpMailTransport;

use reminders_domain::{
    CalendarEvent, DeliveryFailure, DeliveryOutcome, EmailAddress, NotificationKind,
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{error, warn};

/// Delivers notifications about a `CalendarEvent` to its recipients.
///
/// Knows nothing about scheduling and never retries. Problems are reported
/// through the returned `DeliveryOutcome` instead of errors.
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn deliver(
        &self,
        event: &CalendarEvent,
        recipients: &[String],
        kind: NotificationKind,
    ) -> DeliveryOutcome;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub from: String,
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("The mail relay rejected the credentials: {0}")]
    Authentication(String),
    #[error("Unable to send the message: {0}")]
    Transport(String),
    #[error("The message could not be built: {0}")]
    InvalidMessage(String),
}

/// Sends one message at a time to the mail relay
#[async_trait::async_trait]
pub trait IMailTransport: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), TransportError>;
}

/// `INotifier` that sends one email per recipient
pub struct EmailNotifier {
    transport: Arc<dyn IMailTransport>,
    sender: String,
    send_timeout: Option<Duration>,
}

impl EmailNotifier {
    pub fn new(transport: Arc<dyn IMailTransport>, sender: String) -> Self {
        Self {
            transport,
            sender,
            send_timeout: None,
        }
    }

    /// Bounds every single send. A recipient whose send runs out of time
    /// counts as failed and the remaining recipients are still attempted.
    pub fn with_send_timeout(mut self, send_timeout: Option<Duration>) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    async fn send(&self, message: &MailMessage) -> Result<(), SendError> {
        let send = self.transport.send(message);
        match self.send_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| SendError::Timeout)?
                .map_err(SendError::Transport),
            None => send.await.map_err(SendError::Transport),
        }
    }
}

#[derive(Error, Debug)]
enum SendError {
    #[error("{0}")]
    Transport(TransportError),
    #[error("The send did not complete in time")]
    Timeout,
}

#[async_trait::async_trait]
impl INotifier for EmailNotifier {
    async fn deliver(
        &self,
        event: &CalendarEvent,
        recipients: &[String],
        kind: NotificationKind,
    ) -> DeliveryOutcome {
        if recipients.is_empty() {
            return DeliveryOutcome::Failed(DeliveryFailure::NoValidRecipients);
        }

        let subject = kind.subject(&event.title);
        let body = event.message_body();

        let mut delivered = 0;
        let mut failed_recipients = Vec::new();
        let mut auth_failure = None;
        let mut transport_failure = None;
        let mut timed_out = false;

        for recipient in recipients {
            let to = match EmailAddress::parse(recipient) {
                Ok(to) => to,
                Err(e) => {
                    warn!("Skipping recipient of event {}: {}", event.id, e);
                    failed_recipients.push(recipient.clone());
                    continue;
                }
            };
            let message = MailMessage {
                from: self.sender.clone(),
                to,
                subject: subject.clone(),
                body: body.clone(),
            };
            match self.send(&message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    error!(
                        "Unable to send {:?} of event {} to {}. Err: {}",
                        kind, event.id, recipient, e
                    );
                    failed_recipients.push(recipient.clone());
                    match e {
                        SendError::Transport(TransportError::Authentication(reason)) => {
                            auth_failure.get_or_insert(reason);
                        }
                        SendError::Transport(TransportError::Transport(reason))
                        | SendError::Transport(TransportError::InvalidMessage(reason)) => {
                            transport_failure.get_or_insert(reason);
                        }
                        SendError::Timeout => timed_out = true,
                    }
                }
            }
        }

        if failed_recipients.is_empty() {
            DeliveryOutcome::Delivered
        } else if delivered > 0 {
            DeliveryOutcome::PartiallyDelivered(failed_recipients)
        } else if let Some(reason) = auth_failure {
            DeliveryOutcome::Failed(DeliveryFailure::Authentication(reason))
        } else if let Some(reason) = transport_failure {
            DeliveryOutcome::Failed(DeliveryFailure::Transport(reason))
        } else if timed_out {
            DeliveryOutcome::Failed(DeliveryFailure::Timeout)
        } else {
            DeliveryOutcome::Failed(DeliveryFailure::NoValidRecipients)
        }
    }
}
