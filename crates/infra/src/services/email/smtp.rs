use super::{IMailTransport, MailMessage, TransportError};
use crate::config::SmtpConfig;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Reply codes a relay answers with when it refuses the login
const AUTHENTICATION_CODES: [&str; 3] = ["530", "534", "535"];

/// Sends messages through a STARTTLS secured SMTP submission relay
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| TransportError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self { mailer })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| TransportError::InvalidMessage(format!("{}: {}", address, e)))
}

fn is_authentication_code(code: &str) -> bool {
    AUTHENTICATION_CODES.contains(&code)
}

fn transport_error(code: Option<&str>, reason: String) -> TransportError {
    if code.map_or(false, is_authentication_code) {
        TransportError::Authentication(reason)
    } else {
        TransportError::Transport(reason)
    }
}

fn classify(e: SmtpError) -> TransportError {
    let code = e.status().map(|code| code.to_string());
    transport_error(code.as_deref(), e.to_string())
}

#[async_trait::async_trait]
impl IMailTransport for SmtpMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        let email = Message::builder()
            .from(parse_mailbox(&message.from)?)
            .to(parse_mailbox(message.to.as_str())?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| TransportError::InvalidMessage(e.to_string()))?;

        self.mailer.send(email).await.map(|_| ()).map_err(classify)
    }
}
