use std::fmt::Display;

/// Reason a notification could not be delivered to anyone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The mail relay rejected the sender credentials
    Authentication(String),
    /// Connection, TLS or protocol level failure
    Transport(String),
    /// Not a single recipient address was usable
    NoValidRecipients,
    /// The delivery did not finish in time
    Timeout,
}

impl Display for DeliveryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication(e) => write!(f, "authentication failed: {}", e),
            Self::Transport(e) => write!(f, "transport failed: {}", e),
            Self::NoValidRecipients => write!(f, "no valid recipients"),
            Self::Timeout => write!(f, "delivery timed out"),
        }
    }
}

/// Result of delivering one notification to a set of recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Some recipients got the message, the listed ones did not
    PartiallyDelivered(Vec<String>),
    Failed(DeliveryFailure),
}
