use std::{fmt::Display, str::FromStr, time::Duration as StdDuration};
use tracing::{info, warn};

/// Connection settings for the outbound mail relay
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// Submission port, the connection is upgraded with STARTTLS
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Address the notifications are sent from
    pub sender: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// How long before the start of a `CalendarEvent` its reminder is sent
    pub lead_interval: chrono::Duration,
    pub smtp: SmtpConfig,
    /// Whether participants get an invitation as soon as an event is created
    pub send_invitations: bool,
    /// Upper bound for sending one message to one recipient.
    /// `None` waits for the mail relay to either succeed or fail.
    pub delivery_timeout: Option<StdDuration>,
}

const DEFAULT_LEAD_MINUTES: i64 = 30;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SENDER_USERNAME: &str = "eventManager";
const DEFAULT_SENDER: &str = "personaleventmanager@gmail.com";
const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 60;

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match std::env::var(key) {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => {
            info!(
                "Did not find {} environment variable. Using the default: {}",
                key, default
            );
            default
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let lead_minutes = env_or("REMINDER_LEAD_MINUTES", DEFAULT_LEAD_MINUTES);
        let lead_minutes = if lead_minutes < 0 {
            warn!(
                "REMINDER_LEAD_MINUTES can not be negative, falling back to the default: {}.",
                DEFAULT_LEAD_MINUTES
            );
            DEFAULT_LEAD_MINUTES
        } else {
            lead_minutes
        };

        let password = match std::env::var("EMAIL_SENDER_PASSWORD") {
            Ok(password) => password,
            Err(_) => {
                warn!("Did not find EMAIL_SENDER_PASSWORD environment variable. The mail relay will most likely reject the notifications.");
                String::new()
            }
        };

        let delivery_timeout_secs = env_or("DELIVERY_TIMEOUT_SECS", DEFAULT_DELIVERY_TIMEOUT_SECS);

        Self {
            lead_interval: chrono::Duration::minutes(lead_minutes),
            smtp: SmtpConfig {
                host: env_or("SMTP_HOST", DEFAULT_SMTP_HOST.to_string()),
                port: env_or("SMTP_PORT", DEFAULT_SMTP_PORT),
                username: env_or("EMAIL_SENDER_USERNAME", DEFAULT_SENDER_USERNAME.to_string()),
                password,
                sender: env_or("SENDER", DEFAULT_SENDER.to_string()),
            },
            send_invitations: env_or("SEND_INVITATIONS", false),
            delivery_timeout: match delivery_timeout_secs {
                0 => None,
                secs => Some(StdDuration::from_secs(secs)),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
